//! # Evidence Item Aggregate
//!
//! An evidence item with its chain-of-custody ledger and the denormalized
//! `custody_status` the ledger derives. All mutation flows through
//! [`EvidenceItem::append`] and [`EvidenceItem::decide`]; the status field
//! is private so no caller can move it out from under its ledger.
//!
//! ## Design Decision
//!
//! The aggregate is a mutable struct with validated transitions rather
//! than a typestate per status. The custody relation is small (four
//! statuses) but the action set is wide (15 actions) and arrives as data
//! from the wire, so runtime validation with structured errors is the
//! right shape; the closed enums keep the `match`es exhaustive.
//!
//! ## Ledger Invariant
//!
//! Replaying the approved entries in order always reproduces the stored
//! status. [`EvidenceItem::verify_ledger`] checks exactly that; rows
//! imported from the predecessor system with the legacy `RETURNED` status
//! fail the check and surface in the consistency report.

use serde::{Deserialize, Serialize};

use evault_core::{CaseId, ContentDigest, EntryId, EvidenceId, Role, Timestamp, UserId, ValidationError};

use crate::action::CustodyAction;
use crate::entry::{ApprovalDecision, ApprovalStatus, CustodyEntry, NewCustodyEntry, Purpose};
use crate::error::CustodyError;
use crate::status::{CustodyStatus, EvidenceCategory};

/// Parameters for registering a newly seized or collected item.
#[derive(Debug, Clone)]
pub struct SeizureRequest {
    /// The owning case.
    pub case_id: CaseId,
    /// Digital or physical.
    pub category: EvidenceCategory,
    /// The intake action: `SEIZED` or `COLLECTED`.
    pub action: CustodyAction,
    /// The custodian taking initial possession.
    pub custodian: UserId,
    /// Where the item is stored on intake.
    pub storage_location: String,
    /// Why the item was taken.
    pub purpose: Purpose,
    /// Pre-computed content digest, if the item was hashed on intake.
    pub content_hash: Option<ContentDigest>,
    /// Retention policy label, if assigned on intake.
    pub retention_label: Option<String>,
    /// Who recorded the seizure.
    pub recorded_by: UserId,
}

/// A flagged break in the handoff chain.
///
/// The custodian receiving entry *n* should be the one recording entry
/// *n + 1*. A mismatch is a data-quality flag, never a hard rejection;
/// legitimate ledgers contain them (a vault clerk logging on an officer's
/// behalf, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffGap {
    /// Sequence number of the entry recorded by the unexpected party.
    pub seq: u64,
    /// The custodian who held the item going into this entry.
    pub expected: UserId,
    /// Who actually recorded the entry.
    pub recorded_by: UserId,
}

/// A stored snapshot of an evidence item, the shape persisted and exported.
///
/// The aggregate itself is never serialized directly; this record is the
/// narrow adapter at the persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// Unique item identifier.
    pub id: EvidenceId,
    /// The owning case.
    pub case_id: CaseId,
    /// Digital or physical.
    pub category: EvidenceCategory,
    /// The denormalized custody status.
    pub status: CustodyStatus,
    /// The item's vault storage location.
    pub storage_location: String,
    /// SHA-256 digest of the item's content, once computed.
    pub content_hash: Option<ContentDigest>,
    /// Retention policy label.
    pub retention_label: Option<String>,
    /// The full chain of custody, in ledger order.
    pub entries: Vec<CustodyEntry>,
    /// When the item was registered.
    pub created_at: Timestamp,
    /// When the item last changed.
    pub updated_at: Timestamp,
}

/// An evidence item with its chain-of-custody ledger.
#[derive(Debug, Clone)]
pub struct EvidenceItem {
    /// Unique item identifier.
    pub id: EvidenceId,
    /// The owning case.
    pub case_id: CaseId,
    /// Digital or physical.
    pub category: EvidenceCategory,
    /// The item's vault storage location.
    pub storage_location: String,
    /// SHA-256 digest of the item's content, once computed.
    pub content_hash: Option<ContentDigest>,
    /// Retention policy label.
    pub retention_label: Option<String>,
    /// When the item was registered.
    pub created_at: Timestamp,
    /// When the item last changed.
    pub updated_at: Timestamp,
    status: CustodyStatus,
    entries: Vec<CustodyEntry>,
}

impl EvidenceItem {
    /// Register a newly seized or collected item.
    ///
    /// The item starts `IN_VAULT` with its intake entry already committed
    /// as `APPROVED`: taking evidence into custody is a recorded fact, not
    /// a request awaiting sign-off.
    pub fn seize(request: SeizureRequest) -> Result<Self, CustodyError> {
        if !request.action.is_intake() {
            return Err(CustodyError::Validation(ValidationError::new(
                "action",
                format!(
                    "registration requires an intake action (SEIZED or COLLECTED), got {}",
                    request.action
                ),
            )));
        }
        let now = Timestamp::now();
        let intake = CustodyEntry {
            id: EntryId::new(),
            seq: 1,
            action: request.action,
            custodian_from: None,
            custodian_to: request.custodian,
            location_from: None,
            location_to: Some(request.storage_location.clone()),
            purpose: request.purpose,
            signature_ref: None,
            requires_approval: false,
            approval_status: ApprovalStatus::Approved,
            approved_by: None,
            decided_at: None,
            recorded_by: request.recorded_by,
            recorded_at: now,
        };
        Ok(Self {
            id: EvidenceId::new(),
            case_id: request.case_id,
            category: request.category,
            storage_location: request.storage_location,
            content_hash: request.content_hash,
            retention_label: request.retention_label,
            created_at: now,
            updated_at: now,
            status: CustodyStatus::InVault,
            entries: vec![intake],
        })
    }

    /// Reassemble an item from its stored record.
    ///
    /// The snapshot is trusted as-recorded; [`verify_ledger()`](Self::verify_ledger)
    /// is the check that it still matches its ledger.
    pub fn from_record(record: EvidenceRecord) -> Self {
        Self {
            id: record.id,
            case_id: record.case_id,
            category: record.category,
            storage_location: record.storage_location,
            content_hash: record.content_hash,
            retention_label: record.retention_label,
            created_at: record.created_at,
            updated_at: record.updated_at,
            status: record.status,
            entries: record.entries,
        }
    }

    /// Snapshot the item for persistence or export.
    pub fn to_record(&self) -> EvidenceRecord {
        EvidenceRecord {
            id: self.id,
            case_id: self.case_id,
            category: self.category,
            status: self.status,
            storage_location: self.storage_location.clone(),
            content_hash: self.content_hash,
            retention_label: self.retention_label.clone(),
            entries: self.entries.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// The current custody status.
    pub fn status(&self) -> CustodyStatus {
        self.status
    }

    /// The chain of custody, in ledger order.
    pub fn entries(&self) -> &[CustodyEntry] {
        &self.entries
    }

    /// Find an entry by identifier.
    pub fn entry(&self, entry_id: EntryId) -> Option<&CustodyEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    /// The custodian currently holding the item: the receiving side of the
    /// most recent effective entry.
    pub fn current_custodian(&self) -> Option<UserId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.is_effective())
            .map(|e| e.custodian_to)
    }

    /// Append a proposed custody entry, validating it against the current
    /// status.
    ///
    /// With `requires_approval = false` the entry commits immediately and
    /// any status change applies atomically with it. With
    /// `requires_approval = true` the entry is recorded `PENDING` and the
    /// status is untouched until a supervisor decides it.
    ///
    /// While a status-changing entry is pending, further status-changing
    /// appends fail with [`CustodyError::ApprovalRequired`]; handling
    /// entries remain legal.
    pub fn append(&mut self, request: NewCustodyEntry) -> Result<&CustodyEntry, CustodyError> {
        if request.action.is_intake() {
            return Err(CustodyError::InvalidTransition {
                from: self.status,
                action: request.action,
            });
        }
        let target = request.action.effect(self.status)?;
        if request.action.kind().moves_custody() {
            if let Some(pending) = self.pending_status_change() {
                return Err(CustodyError::ApprovalRequired {
                    entry_id: pending.id,
                });
            }
        }

        let now = Timestamp::now();
        let entry = CustodyEntry {
            id: EntryId::new(),
            seq: self.next_seq(),
            action: request.action,
            custodian_from: self.current_custodian(),
            custodian_to: request.custodian_to,
            location_from: self.current_location(),
            location_to: request.location_to,
            purpose: request.purpose,
            signature_ref: request.signature_ref,
            requires_approval: request.requires_approval,
            approval_status: if request.requires_approval {
                ApprovalStatus::Pending
            } else {
                ApprovalStatus::Approved
            },
            approved_by: None,
            decided_at: None,
            recorded_by: request.actor,
            recorded_at: now,
        };

        if !request.requires_approval {
            if let Some(next) = target {
                self.status = next;
            }
        }
        self.updated_at = now;
        let idx = self.entries.len();
        self.entries.push(entry);
        Ok(&self.entries[idx])
    }

    /// Decide a pending entry. Exactly once, supervisors only, and never
    /// by the entry's own recorder.
    ///
    /// `APPROVE` re-validates a status-changing entry against the *current*
    /// status before applying it; the item may have moved while the entry
    /// sat pending. Approving a handling entry never consults the status —
    /// there is no transition to re-validate, and the documented work
    /// happened regardless of where the item is now. `REJECT` records the
    /// decision and leaves the status untouched.
    pub fn decide(
        &mut self,
        entry_id: EntryId,
        decision: ApprovalDecision,
        actor: UserId,
        actor_role: Role,
    ) -> Result<&CustodyEntry, CustodyError> {
        if !actor_role.is_supervisory() {
            return Err(CustodyError::Forbidden {
                reason: format!("role {actor_role} cannot decide custody approvals"),
            });
        }
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or(CustodyError::UnknownEntry { entry_id })?;
        if self.entries[idx].approval_status.is_decided() {
            return Err(CustodyError::AlreadyDecided {
                entry_id,
                status: self.entries[idx].approval_status,
            });
        }
        if self.entries[idx].recorded_by == actor {
            return Err(CustodyError::Forbidden {
                reason: "custody entries cannot be approved by their own recorder".to_string(),
            });
        }

        let now = Timestamp::now();
        match decision {
            ApprovalDecision::Approve => {
                let target = if self.entries[idx].action.kind().moves_custody() {
                    self.entries[idx].action.effect(self.status)?
                } else {
                    None
                };
                let entry = &mut self.entries[idx];
                entry.approval_status = ApprovalStatus::Approved;
                entry.approved_by = Some(actor);
                entry.decided_at = Some(now);
                if let Some(next) = target {
                    self.status = next;
                }
            }
            ApprovalDecision::Reject => {
                let entry = &mut self.entries[idx];
                entry.approval_status = ApprovalStatus::Rejected;
                entry.approved_by = Some(actor);
                entry.decided_at = Some(now);
            }
        }
        self.updated_at = now;
        Ok(&self.entries[idx])
    }

    /// Derive the custody status by replaying this item's ledger.
    pub fn replay_status(&self) -> CustodyStatus {
        Self::replay(&self.entries)
    }

    /// Fold a ledger into the status it derives.
    ///
    /// Pure: applies every approved entry in order, starting from
    /// `IN_VAULT` at intake. Pending and rejected entries contribute
    /// nothing. Entries whose action does not apply to the running status
    /// are skipped — a ledger built through [`append()`](Self::append)
    /// never contains one, but imported ledgers are folded leniently and
    /// judged by [`verify_ledger()`](Self::verify_ledger).
    pub fn replay(entries: &[CustodyEntry]) -> CustodyStatus {
        let mut status = CustodyStatus::InVault;
        for entry in entries {
            if !entry.is_effective() {
                continue;
            }
            if entry.action.is_intake() {
                status = CustodyStatus::InVault;
                continue;
            }
            if let Ok(Some(next)) = entry.action.effect(status) {
                status = next;
            }
        }
        status
    }

    /// Whether the stored status equals the status the ledger derives.
    pub fn verify_ledger(&self) -> bool {
        self.replay_status() == self.status
    }

    /// Flag entries recorded by someone other than the custodian who held
    /// the item at that point. Data-quality signal, never an error.
    pub fn handoff_gaps(&self) -> Vec<HandoffGap> {
        let effective: Vec<&CustodyEntry> =
            self.entries.iter().filter(|e| e.is_effective()).collect();
        let mut gaps = Vec::new();
        for pair in effective.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            if current.recorded_by != previous.custodian_to {
                gaps.push(HandoffGap {
                    seq: current.seq,
                    expected: previous.custodian_to,
                    recorded_by: current.recorded_by,
                });
            }
        }
        gaps
    }

    /// The pending entry whose approval would change the status, if any.
    pub fn pending_status_change(&self) -> Option<&CustodyEntry> {
        self.entries
            .iter()
            .find(|e| e.is_pending() && e.action.kind().moves_custody())
    }

    fn next_seq(&self) -> u64 {
        self.entries.last().map(|e| e.seq + 1).unwrap_or(1)
    }

    /// Where the item is right now: the destination of the latest
    /// effective entry that recorded one, else its vault location.
    fn current_location(&self) -> Option<String> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.is_effective())
            .find_map(|e| e.location_to.clone())
            .or_else(|| Some(self.storage_location.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn purpose(text: &str) -> Purpose {
        Purpose::new(text).unwrap()
    }

    fn seized_item(custodian: UserId) -> EvidenceItem {
        EvidenceItem::seize(SeizureRequest {
            case_id: CaseId::new(),
            category: EvidenceCategory::Physical,
            action: CustodyAction::Seized,
            custodian,
            storage_location: "vault A, shelf 3".to_string(),
            purpose: purpose("seized during warrant execution"),
            content_hash: None,
            retention_label: None,
            recorded_by: custodian,
        })
        .unwrap()
    }

    fn transfer(actor: UserId, to: UserId, requires_approval: bool) -> NewCustodyEntry {
        NewCustodyEntry {
            action: CustodyAction::Transferred,
            actor,
            custodian_to: to,
            location_to: Some("forensics lab".to_string()),
            purpose: purpose("transfer for analysis"),
            signature_ref: None,
            requires_approval,
        }
    }

    fn entry_for(action: CustodyAction, actor: UserId) -> NewCustodyEntry {
        NewCustodyEntry {
            action,
            actor,
            custodian_to: actor,
            location_to: None,
            purpose: purpose("ledger entry"),
            signature_ref: None,
            requires_approval: false,
        }
    }

    // -- Registration ----------------------------------------------------

    #[test]
    fn seize_starts_in_vault_with_intake_entry() {
        let officer = UserId::new();
        let item = seized_item(officer);

        assert_eq!(item.status(), CustodyStatus::InVault);
        assert_eq!(item.entries().len(), 1);

        let intake = &item.entries()[0];
        assert_eq!(intake.seq, 1);
        assert_eq!(intake.action, CustodyAction::Seized);
        assert_eq!(intake.custodian_from, None);
        assert_eq!(intake.custodian_to, officer);
        assert_eq!(intake.approval_status, ApprovalStatus::Approved);
        assert!(item.verify_ledger());
    }

    #[test]
    fn seize_rejects_non_intake_action() {
        let officer = UserId::new();
        let result = EvidenceItem::seize(SeizureRequest {
            case_id: CaseId::new(),
            category: EvidenceCategory::Digital,
            action: CustodyAction::Transferred,
            custodian: officer,
            storage_location: "vault B".to_string(),
            purpose: purpose("invalid registration"),
            content_hash: None,
            retention_label: None,
            recorded_by: officer,
        });
        assert!(matches!(result, Err(CustodyError::Validation(_))));
    }

    #[test]
    fn intake_cannot_be_appended_to_existing_item() {
        let officer = UserId::new();
        let mut item = seized_item(officer);
        let result = item.append(entry_for(CustodyAction::Seized, officer));
        assert!(matches!(
            result,
            Err(CustodyError::InvalidTransition { .. })
        ));
    }

    // -- Transfer and return flow --

    #[test]
    fn transfer_then_return_round_trip() {
        let officer_a = UserId::new();
        let officer_b = UserId::new();
        let mut item = seized_item(officer_a);

        item.append(transfer(officer_a, officer_b, false)).unwrap();
        assert_eq!(item.status(), CustodyStatus::Released);
        assert_eq!(item.entries().len(), 2);
        assert_eq!(item.current_custodian(), Some(officer_b));

        item.append(NewCustodyEntry {
            action: CustodyAction::Returned,
            actor: officer_b,
            custodian_to: officer_a,
            location_to: Some("vault A, shelf 3".to_string()),
            purpose: purpose("analysis complete"),
            signature_ref: None,
            requires_approval: false,
        })
        .unwrap();
        assert_eq!(item.status(), CustodyStatus::InVault);
        assert_eq!(item.entries().len(), 3);
        assert!(item.verify_ledger());
    }

    #[test]
    fn append_derives_custodian_from_and_location_from() {
        let officer_a = UserId::new();
        let officer_b = UserId::new();
        let mut item = seized_item(officer_a);

        let entry = item.append(transfer(officer_a, officer_b, false)).unwrap();
        assert_eq!(entry.custodian_from, Some(officer_a));
        assert_eq!(entry.location_from, Some("vault A, shelf 3".to_string()));
        assert_eq!(entry.seq, 2);
    }

    #[test]
    fn transfer_requires_in_vault() {
        let officer_a = UserId::new();
        let officer_b = UserId::new();
        let mut item = seized_item(officer_a);
        item.append(transfer(officer_a, officer_b, false)).unwrap();

        // Already released: a second release is illegal.
        let result = item.append(transfer(officer_b, UserId::new(), false));
        assert!(matches!(
            result,
            Err(CustodyError::InvalidTransition {
                from: CustodyStatus::Released,
                action: CustodyAction::Transferred,
            })
        ));
    }

    // -- Approval workflow ----------------------------------------------

    #[test]
    fn pending_transfer_leaves_status_untouched() {
        let officer_a = UserId::new();
        let officer_b = UserId::new();
        let mut item = seized_item(officer_a);

        let entry = item.append(transfer(officer_a, officer_b, true)).unwrap();
        assert_eq!(entry.approval_status, ApprovalStatus::Pending);
        assert_eq!(item.status(), CustodyStatus::InVault);
        // The pending entry is not effective, so custody stays put.
        assert_eq!(item.current_custodian(), Some(officer_a));
    }

    #[test]
    fn approve_applies_status_change_once() {
        let officer_a = UserId::new();
        let officer_b = UserId::new();
        let supervisor = UserId::new();
        let mut item = seized_item(officer_a);

        let entry_id = item.append(transfer(officer_a, officer_b, true)).unwrap().id;
        let decided = item
            .decide(
                entry_id,
                ApprovalDecision::Approve,
                supervisor,
                Role::Supervisor,
            )
            .unwrap();
        assert_eq!(decided.approval_status, ApprovalStatus::Approved);
        assert_eq!(decided.approved_by, Some(supervisor));
        assert!(decided.decided_at.is_some());
        assert_eq!(item.status(), CustodyStatus::Released);
        assert!(item.verify_ledger());
    }

    #[test]
    fn second_decision_fails_already_decided() {
        let officer_a = UserId::new();
        let supervisor = UserId::new();
        let mut item = seized_item(officer_a);

        let entry_id = item
            .append(transfer(officer_a, UserId::new(), true))
            .unwrap()
            .id;
        item.decide(
            entry_id,
            ApprovalDecision::Approve,
            supervisor,
            Role::Supervisor,
        )
        .unwrap();

        let second = item.decide(
            entry_id,
            ApprovalDecision::Approve,
            supervisor,
            Role::Supervisor,
        );
        assert!(matches!(
            second,
            Err(CustodyError::AlreadyDecided {
                status: ApprovalStatus::Approved,
                ..
            })
        ));
        // The status changed exactly once.
        assert_eq!(item.status(), CustodyStatus::Released);
    }

    #[test]
    fn reject_leaves_status_untouched() {
        let officer_a = UserId::new();
        let supervisor = UserId::new();
        let mut item = seized_item(officer_a);

        let entry_id = item
            .append(transfer(officer_a, UserId::new(), true))
            .unwrap()
            .id;
        let decided = item
            .decide(
                entry_id,
                ApprovalDecision::Reject,
                supervisor,
                Role::Supervisor,
            )
            .unwrap();
        assert_eq!(decided.approval_status, ApprovalStatus::Rejected);
        assert_eq!(item.status(), CustodyStatus::InVault);
        assert!(item.verify_ledger());

        // A rejected release no longer blocks a new one.
        item.append(transfer(officer_a, UserId::new(), false))
            .unwrap();
        assert_eq!(item.status(), CustodyStatus::Released);
    }

    #[test]
    fn non_supervisor_cannot_decide() {
        let officer_a = UserId::new();
        let mut item = seized_item(officer_a);
        let entry_id = item
            .append(transfer(officer_a, UserId::new(), true))
            .unwrap()
            .id;

        for role in [
            Role::Auditor,
            Role::Officer,
            Role::Analyst,
            Role::Investigator,
            Role::Prosecutor,
        ] {
            let result = item.decide(entry_id, ApprovalDecision::Approve, UserId::new(), role);
            assert!(
                matches!(result, Err(CustodyError::Forbidden { .. })),
                "{role} must not decide approvals"
            );
        }
        assert_eq!(item.status(), CustodyStatus::InVault);
    }

    #[test]
    fn recorder_cannot_approve_own_entry() {
        let supervisor = UserId::new();
        let mut item = seized_item(supervisor);
        let entry_id = item
            .append(transfer(supervisor, UserId::new(), true))
            .unwrap()
            .id;

        let result = item.decide(
            entry_id,
            ApprovalDecision::Approve,
            supervisor,
            Role::Supervisor,
        );
        assert!(matches!(result, Err(CustodyError::Forbidden { .. })));
        // Still pending: another supervisor can decide it.
        assert!(item.entry(entry_id).unwrap().is_pending());
    }

    #[test]
    fn deciding_unknown_entry_fails() {
        let officer = UserId::new();
        let mut item = seized_item(officer);
        let result = item.decide(
            EntryId::new(),
            ApprovalDecision::Approve,
            UserId::new(),
            Role::Admin,
        );
        assert!(matches!(result, Err(CustodyError::UnknownEntry { .. })));
    }

    #[test]
    fn pending_status_change_blocks_conflicting_appends() {
        let officer_a = UserId::new();
        let mut item = seized_item(officer_a);
        let pending_id = item
            .append(transfer(officer_a, UserId::new(), true))
            .unwrap()
            .id;

        // A second status-changing append must wait for the decision.
        let blocked = item.append(entry_for(CustodyAction::Disposed, officer_a));
        match blocked {
            Err(CustodyError::ApprovalRequired { entry_id }) => {
                assert_eq!(entry_id, pending_id)
            }
            other => panic!("expected ApprovalRequired, got {other:?}"),
        }

        // Handling entries stay legal while the transfer is pending.
        item.append(entry_for(CustodyAction::Examined, officer_a))
            .unwrap();
        assert_eq!(item.status(), CustodyStatus::InVault);
    }

    #[test]
    fn pending_handling_entry_approves_without_status_check() {
        let officer_a = UserId::new();
        let supervisor = UserId::new();
        let mut item = seized_item(officer_a);

        let analysis_id = item
            .append(NewCustodyEntry {
                action: CustodyAction::Analyzed,
                actor: officer_a,
                custodian_to: officer_a,
                location_to: None,
                purpose: purpose("dna analysis"),
                signature_ref: None,
                requires_approval: true,
            })
            .unwrap()
            .id;

        // A pending handling entry does not block disposal.
        item.append(entry_for(CustodyAction::Disposed, officer_a))
            .unwrap();
        assert_eq!(item.status(), CustodyStatus::Disposed);

        // The analysis still happened; approving it records that fact.
        let decided = item
            .decide(
                analysis_id,
                ApprovalDecision::Approve,
                supervisor,
                Role::Supervisor,
            )
            .unwrap();
        assert_eq!(decided.approval_status, ApprovalStatus::Approved);
        assert_eq!(item.status(), CustodyStatus::Disposed);
        assert!(item.verify_ledger());
    }

    // -- Terminal state --------------------------------------------------

    #[test]
    fn disposed_rejects_every_action() {
        let officer = UserId::new();
        let mut item = seized_item(officer);
        item.append(entry_for(CustodyAction::Disposed, officer))
            .unwrap();
        assert_eq!(item.status(), CustodyStatus::Disposed);

        for action in CustodyAction::ALL {
            let result = item.append(entry_for(action, officer));
            assert!(
                matches!(result, Err(CustodyError::InvalidTransition { .. })),
                "{action} must be rejected on disposed evidence"
            );
        }
        // Nothing was appended.
        assert_eq!(item.entries().len(), 2);
    }

    #[test]
    fn disposal_legal_from_released() {
        let officer_a = UserId::new();
        let officer_b = UserId::new();
        let mut item = seized_item(officer_a);
        item.append(transfer(officer_a, officer_b, false)).unwrap();
        item.append(entry_for(CustodyAction::Disposed, officer_b))
            .unwrap();
        assert_eq!(item.status(), CustodyStatus::Disposed);
        assert!(item.verify_ledger());
    }

    // -- Imported legacy rows --------------------------------------------

    #[test]
    fn returned_item_accepts_only_disposal_and_handling() {
        let officer = UserId::new();
        let template = seized_item(officer);
        let mut record = template.to_record();
        record.status = CustodyStatus::Returned;
        let mut item = EvidenceItem::from_record(record);

        assert!(matches!(
            item.append(transfer(officer, UserId::new(), false)),
            Err(CustodyError::InvalidTransition { .. })
        ));
        item.append(entry_for(CustodyAction::Examined, officer))
            .unwrap();
        assert_eq!(item.status(), CustodyStatus::Returned);
        item.append(entry_for(CustodyAction::Disposed, officer))
            .unwrap();
        assert_eq!(item.status(), CustodyStatus::Disposed);
    }

    #[test]
    fn imported_returned_status_fails_ledger_verification() {
        let officer = UserId::new();
        let mut record = seized_item(officer).to_record();
        record.status = CustodyStatus::Returned;
        let item = EvidenceItem::from_record(record);

        // No action sequence derives RETURNED; the report flags it.
        assert!(!item.verify_ledger());
        assert_eq!(item.replay_status(), CustodyStatus::InVault);
    }

    #[test]
    fn record_round_trip_preserves_ledger() {
        let officer_a = UserId::new();
        let officer_b = UserId::new();
        let mut item = seized_item(officer_a);
        item.append(transfer(officer_a, officer_b, false)).unwrap();

        let record = item.to_record();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: EvidenceRecord = serde_json::from_str(&json).unwrap();
        let restored = EvidenceItem::from_record(parsed);

        assert_eq!(restored.status(), CustodyStatus::Released);
        assert_eq!(restored.entries().len(), 2);
        assert!(restored.verify_ledger());
    }

    // -- Replay and handoff consistency ----------------------------------

    #[test]
    fn replay_ignores_pending_and_rejected_entries() {
        let officer_a = UserId::new();
        let supervisor = UserId::new();
        let mut item = seized_item(officer_a);

        let rejected_id = item
            .append(transfer(officer_a, UserId::new(), true))
            .unwrap()
            .id;
        item.decide(
            rejected_id,
            ApprovalDecision::Reject,
            supervisor,
            Role::Supervisor,
        )
        .unwrap();
        item.append(transfer(officer_a, UserId::new(), true))
            .unwrap();

        // One rejected release, one pending release: the vault still holds it.
        assert_eq!(item.replay_status(), CustodyStatus::InVault);
        assert!(item.verify_ledger());
    }

    #[test]
    fn handoff_gap_flagged_when_recorder_is_not_custodian() {
        let officer_a = UserId::new();
        let officer_b = UserId::new();
        let clerk = UserId::new();
        let mut item = seized_item(officer_a);
        item.append(transfer(officer_a, officer_b, false)).unwrap();

        // The clerk records the return instead of officer B.
        item.append(NewCustodyEntry {
            action: CustodyAction::Checkin,
            actor: clerk,
            custodian_to: officer_a,
            location_to: Some("vault A".to_string()),
            purpose: purpose("returned at front desk"),
            signature_ref: None,
            requires_approval: false,
        })
        .unwrap();

        let gaps = item.handoff_gaps();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].seq, 3);
        assert_eq!(gaps[0].expected, officer_b);
        assert_eq!(gaps[0].recorded_by, clerk);
    }

    #[test]
    fn clean_handoff_chain_has_no_gaps() {
        let officer_a = UserId::new();
        let officer_b = UserId::new();
        let mut item = seized_item(officer_a);
        item.append(transfer(officer_a, officer_b, false)).unwrap();
        item.append(NewCustodyEntry {
            action: CustodyAction::Returned,
            actor: officer_b,
            custodian_to: officer_a,
            location_to: Some("vault A".to_string()),
            purpose: purpose("returned"),
            signature_ref: None,
            requires_approval: false,
        })
        .unwrap();

        assert!(item.handoff_gaps().is_empty());
    }

    // -- Ledger monotonicity property ------------------------------------

    proptest! {
        /// Any sequence of accepted appends keeps the stored status equal
        /// to the replayed status.
        #[test]
        fn accepted_appends_never_diverge_from_replay(
            actions in prop::collection::vec(
                prop::sample::select(CustodyAction::ALL.to_vec()),
                0..40
            ),
            approvals in prop::collection::vec(any::<bool>(), 0..40),
        ) {
            let officer = UserId::new();
            let supervisor = UserId::new();
            let mut item = seized_item(officer);

            for (i, action) in actions.iter().enumerate() {
                let requires_approval = approvals.get(i).copied().unwrap_or(false);
                let request = NewCustodyEntry {
                    action: *action,
                    actor: officer,
                    custodian_to: UserId::new(),
                    location_to: None,
                    purpose: purpose("generated"),
                    signature_ref: None,
                    requires_approval,
                };
                if let Ok(entry) = item.append(request) {
                    let id = entry.id;
                    if requires_approval && i % 2 == 0 {
                        // Decide roughly half the pending entries.
                        let _ = item.decide(
                            id,
                            ApprovalDecision::Approve,
                            supervisor,
                            Role::Supervisor,
                        );
                    }
                }
                prop_assert!(item.verify_ledger());
            }
        }
    }
}
