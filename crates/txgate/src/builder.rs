//! Transaction skeleton and builder APIs.

use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_hash::Hash;
use solana_instruction::Instruction;
use solana_message::{Message, VersionedMessage};
use solana_pubkey::Pubkey;
use solana_signer::{SignerError, signers::Signers};
use solana_transaction::versioned::VersionedTransaction;
use thiserror::Error;

/// Builder-layer errors.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Skeleton has no recent blockhash stamped.
    #[error("transaction skeleton has no recent blockhash")]
    MissingRecentBlockhash,
    /// Skeleton has no fee payer stamped.
    #[error("transaction skeleton has no fee payer")]
    MissingFeePayer,
    /// Signing failed with signer-level error.
    #[error("failed to sign transaction: {source}")]
    SignTransaction {
        /// Underlying signer error.
        source: SignerError,
    },
}

/// Unsigned transaction: ordered instructions plus the two fields stamped right before signing.
///
/// Both `recent_blockhash` and `fee_payer` must be present for [`TxSkeleton::sign`] to
/// succeed. [`TxSkeleton::stamp`] overwrites whatever was there before.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TxSkeleton {
    /// Instructions in execution order.
    instructions: Vec<Instruction>,
    /// Freshness token; expires after a short network-defined window.
    recent_blockhash: Option<Hash>,
    /// Account paying the transaction fee.
    fee_payer: Option<Pubkey>,
}

impl TxSkeleton {
    /// Creates a skeleton with no blockhash and no fee payer.
    #[must_use]
    pub const fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            recent_blockhash: None,
            fee_payer: None,
        }
    }

    /// Returns the instruction list.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns the currently stamped blockhash.
    #[must_use]
    pub const fn recent_blockhash(&self) -> Option<Hash> {
        self.recent_blockhash
    }

    /// Returns the currently stamped fee payer.
    #[must_use]
    pub const fn fee_payer(&self) -> Option<Pubkey> {
        self.fee_payer
    }

    /// Sets the recent blockhash.
    pub const fn set_recent_blockhash(&mut self, blockhash: Hash) {
        self.recent_blockhash = Some(blockhash);
    }

    /// Sets the fee payer.
    pub const fn set_fee_payer(&mut self, fee_payer: Pubkey) {
        self.fee_payer = Some(fee_payer);
    }

    /// Stamps blockhash and fee payer together.
    pub const fn stamp(&mut self, blockhash: Hash, fee_payer: Pubkey) {
        self.set_recent_blockhash(blockhash);
        self.set_fee_payer(fee_payer);
    }

    /// Builds a legacy message wrapped as a versioned message.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::MissingRecentBlockhash`] or [`BuilderError::MissingFeePayer`]
    /// when the skeleton has not been stamped.
    pub fn message(&self) -> Result<VersionedMessage, BuilderError> {
        let blockhash = self
            .recent_blockhash
            .ok_or(BuilderError::MissingRecentBlockhash)?;
        let fee_payer = self.fee_payer.ok_or(BuilderError::MissingFeePayer)?;
        let message = Message::new_with_blockhash(&self.instructions, Some(&fee_payer), &blockhash);
        Ok(VersionedMessage::Legacy(message))
    }

    /// Signs the stamped skeleton with every provided signer, in order.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError`] when the skeleton is not stamped or signer validation fails.
    pub fn sign<T>(&self, signers: &T) -> Result<VersionedTransaction, BuilderError>
    where
        T: Signers + ?Sized,
    {
        VersionedTransaction::try_new(self.message()?, signers)
            .map_err(|source| BuilderError::SignTransaction { source })
    }
}

/// Builder that assembles a [`TxSkeleton`] with optional compute-budget prefix instructions.
#[derive(Debug, Clone, Default)]
pub struct TxBuilder {
    /// User-provided instructions.
    instructions: Vec<Instruction>,
    /// Optional compute unit limit.
    compute_unit_limit: Option<u32>,
    /// Optional priority fee (micro-lamports per compute unit).
    priority_fee_micro_lamports: Option<u64>,
}

impl TxBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            instructions: Vec::new(),
            compute_unit_limit: None,
            priority_fee_micro_lamports: None,
        }
    }

    /// Appends one instruction.
    #[must_use]
    pub fn add_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends many instructions.
    #[must_use]
    pub fn add_instructions<I>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = Instruction>,
    {
        self.instructions.extend(instructions);
        self
    }

    /// Sets compute unit limit.
    #[must_use]
    pub const fn with_compute_unit_limit(mut self, units: u32) -> Self {
        self.compute_unit_limit = Some(units);
        self
    }

    /// Sets priority fee in micro-lamports.
    #[must_use]
    pub const fn with_priority_fee_micro_lamports(mut self, micro_lamports: u64) -> Self {
        self.priority_fee_micro_lamports = Some(micro_lamports);
        self
    }

    /// Builds an unstamped skeleton.
    #[must_use]
    pub fn build(self) -> TxSkeleton {
        let mut instructions = Vec::with_capacity(self.instructions.len().saturating_add(2));
        if let Some(units) = self.compute_unit_limit {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(units));
        }
        if let Some(micro_lamports) = self.priority_fee_micro_lamports {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(
                micro_lamports,
            ));
        }
        instructions.extend(self.instructions);
        TxSkeleton::new(instructions)
    }
}

#[cfg(test)]
mod tests {
    use solana_keypair::Keypair;
    use solana_signer::Signer;
    use solana_system_interface::instruction as system_instruction;

    use super::*;

    fn transfer_skeleton(payer: &Keypair) -> TxSkeleton {
        TxBuilder::new()
            .add_instruction(system_instruction::transfer(
                &payer.pubkey(),
                &Pubkey::new_unique(),
                1,
            ))
            .build()
    }

    #[test]
    fn compute_budget_instructions_are_prefixed() {
        let payer = Keypair::new();
        let recipient = Pubkey::new_unique();
        let skeleton = TxBuilder::new()
            .with_compute_unit_limit(200_000)
            .with_priority_fee_micro_lamports(10_000)
            .add_instruction(system_instruction::transfer(&payer.pubkey(), &recipient, 1))
            .build();

        let instructions = skeleton.instructions();
        assert_eq!(instructions.len(), 3);
        let first = instructions.first();
        assert!(first.is_some());
        if let Some(first) = first {
            assert_eq!(first.data.first().copied(), Some(2_u8));
        }
        let second = instructions.get(1);
        assert!(second.is_some());
        if let Some(second) = second {
            assert_eq!(second.data.first().copied(), Some(3_u8));
        }
    }

    #[test]
    fn signing_unstamped_skeleton_is_rejected() {
        let payer = Keypair::new();
        let skeleton = transfer_skeleton(&payer);

        let missing_blockhash = skeleton.sign(&[&payer]);
        assert!(matches!(
            missing_blockhash,
            Err(BuilderError::MissingRecentBlockhash)
        ));

        let mut with_blockhash = skeleton.clone();
        with_blockhash.set_recent_blockhash(Hash::new_from_array([4_u8; 32]));
        let missing_payer = with_blockhash.sign(&[&payer]);
        assert!(matches!(missing_payer, Err(BuilderError::MissingFeePayer)));
    }

    #[test]
    fn stamp_overwrites_stale_fields() {
        let payer = Keypair::new();
        let mut skeleton = transfer_skeleton(&payer);
        skeleton.stamp(Hash::new_from_array([1_u8; 32]), Pubkey::new_unique());
        skeleton.stamp(Hash::new_from_array([2_u8; 32]), payer.pubkey());

        assert_eq!(
            skeleton.recent_blockhash(),
            Some(Hash::new_from_array([2_u8; 32]))
        );
        assert_eq!(skeleton.fee_payer(), Some(payer.pubkey()));
    }

    #[test]
    fn sign_generates_signature_for_fee_payer() {
        let payer = Keypair::new();
        let mut skeleton = transfer_skeleton(&payer);
        skeleton.stamp(Hash::new_from_array([3_u8; 32]), payer.pubkey());

        let tx_result = skeleton.sign(&[&payer]);
        assert!(tx_result.is_ok());
        if let Ok(tx) = tx_result {
            assert_eq!(tx.signatures.len(), 1);
            let first = tx.signatures.first();
            assert!(first.is_some());
            if let Some(first) = first {
                assert_ne!(*first, solana_signature::Signature::default());
            }
            assert_eq!(
                *tx.message.recent_blockhash(),
                Hash::new_from_array([3_u8; 32])
            );
        }
    }

    #[test]
    fn sign_rejects_missing_required_signer() {
        let payer = Keypair::new();
        let stranger = Keypair::new();
        let mut skeleton = transfer_skeleton(&payer);
        skeleton.stamp(Hash::new_from_array([5_u8; 32]), payer.pubkey());

        let tx_result = skeleton.sign(&[&stranger]);
        assert!(matches!(
            tx_result,
            Err(BuilderError::SignTransaction { .. })
        ));
    }
}
