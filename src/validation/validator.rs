use crate::{
    pool::UtxoPool, AmountSum, EpochOutcome, InvalidTransaction, OutputId, RejectReason,
    Rejection, Transaction,
};
use super::{EcdsaVerifier, SignatureVerifier};
use std::collections::HashSet;
use tracing::debug;

/// Outputs a valid transaction consumes and the value it leaves behind
struct Claims {
    ids: HashSet<OutputId>,
    fee: AmountSum,
}

/// Ledger validator over a private snapshot of the unspent output pool
///
/// Not safe for concurrent use: `apply_epoch` mutates the pool while it
/// walks the batch. Share it behind a lock (see `state::SharedLedger`) or
/// give each worker its own validator over its own pool copy.
#[derive(Debug, Clone)]
pub struct LedgerValidator<V = EcdsaVerifier> {
    pool: UtxoPool,
    verifier: V,
}

impl LedgerValidator<EcdsaVerifier> {
    /// Validator over a copy of `pool` using secp256k1 signatures
    pub fn with_ecdsa(pool: &UtxoPool) -> Self {
        Self::new(pool, EcdsaVerifier)
    }
}

impl<V: SignatureVerifier> LedgerValidator<V> {
    /// Creates a validator over a copy of `pool`; the caller's pool is never touched.
    pub fn new(pool: &UtxoPool, verifier: V) -> Self {
        Self::with_pool(pool.clone(), verifier)
    }

    /// Creates a validator that takes ownership of `pool`
    pub fn with_pool(pool: UtxoPool, verifier: V) -> Self {
        Self { pool, verifier }
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    /// Outputs `tx` would consume, or the first rule it breaks.
    ///
    /// Rules, checked in input order then over the outputs:
    /// 1. no output is claimed twice by the same transaction
    /// 2. every claimed output is in the pool
    /// 3. every input signature verifies against the claimed output's owner
    /// 4. no output value is negative
    /// 5. inputs total at least as much as outputs
    pub fn claimed_outputs(&self, tx: &Transaction) -> Result<HashSet<OutputId>, InvalidTransaction> {
        self.claims(tx).map(|claims| claims.ids)
    }

    /// `true` if `tx` may be applied to the current pool
    pub fn is_valid(&self, tx: &Transaction) -> bool {
        self.claims(tx).is_ok()
    }

    /// Validates `tx` and returns the fee it would pay (inputs minus outputs)
    pub fn check(&self, tx: &Transaction) -> Result<AmountSum, InvalidTransaction> {
        self.claims(tx).map(|claims| claims.fee)
    }

    fn claims(&self, tx: &Transaction) -> Result<Claims, InvalidTransaction> {
        let mut ids = HashSet::with_capacity(tx.inputs.len());
        let mut inputs = AmountSum::default();

        for (position, input) in tx.inputs.iter().enumerate() {
            let id = input.output_id();
            if ids.contains(&id) {
                return Err(InvalidTransaction::DoubleClaim(id));
            }

            let spent = self
                .pool
                .get(&id)
                .ok_or(InvalidTransaction::UnknownOutput(id))?;

            let signed = tx
                .raw_data_to_sign(position)
                .is_some_and(|payload| {
                    self.verifier.verify(&spent.owner, &payload, &input.signature)
                });
            if !signed {
                return Err(InvalidTransaction::BadSignature { input: position });
            }

            ids.insert(id);
            inputs.push(spent.value);
        }

        if let Some(output) = tx.outputs.iter().position(|o| o.value.is_negative()) {
            return Err(InvalidTransaction::NegativeOutput { output });
        }

        let outputs: AmountSum = tx.outputs.iter().map(|o| o.value).sum();
        if inputs < outputs {
            return Err(InvalidTransaction::ValueNotConserved { inputs, outputs });
        }

        Ok(Claims {
            ids,
            fee: inputs - outputs,
        })
    }

    /// Applies a batch of candidates in the given order and returns the
    /// accepted ones.
    ///
    /// Each candidate is validated against the pool as left by the
    /// candidates accepted before it, so a transaction may spend outputs
    /// minted earlier in the same batch, and of two candidates racing for
    /// one output only the first wins. Accepted transactions are final;
    /// nothing is re-validated or rolled back. Rejected candidates leave
    /// the pool untouched and are dropped silently.
    pub fn apply_epoch(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.apply_epoch_with_report(candidates).accepted
    }

    /// Same as [`apply_epoch`](Self::apply_epoch), also reporting why each
    /// rejected candidate was dropped and the fees collected.
    pub fn apply_epoch_with_report(&mut self, candidates: &[Transaction]) -> EpochOutcome {
        let mut outcome = EpochOutcome::default();

        for (position, tx) in candidates.iter().enumerate() {
            match self.claims(tx) {
                Ok(claims) => {
                    self.apply(tx, &claims.ids);
                    debug!("Accepted transaction {:?} (fee {})", tx.hash, claims.fee);
                    outcome.fees += claims.fee;
                    outcome.accepted.push(tx.clone());
                }
                Err(reason) => {
                    debug!("Rejected transaction {:?}: {}", tx.hash, reason);
                    outcome.rejected.push(Rejection {
                        position,
                        tx_hash: tx.hash,
                        reason: RejectReason::Invalid(reason),
                    });
                }
            }
        }

        outcome
    }

    fn apply(&mut self, tx: &Transaction, claimed: &HashSet<OutputId>) {
        for id in claimed {
            self.pool.remove(id);
        }
        for (id, output) in tx.minted_ids() {
            self.pool.insert(id, output.clone());
        }
    }
}
