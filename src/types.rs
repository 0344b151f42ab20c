use crate::{Amount, AmountSum};
use ethers::types::{Address, Bytes, H256};
use ethers::utils::keccak256;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Names one spendable output: the hash of the transaction that created it
/// and the output's position within that transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputId {
    pub tx_hash: H256,
    pub index: u32,
}

impl OutputId {
    pub fn new(tx_hash: H256, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.tx_hash, self.index)
    }
}

/// Transaction input claiming a previously created output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub prev_tx_hash: H256,
    pub output_index: u32,
    /// Signature over `Transaction::raw_data_to_sign` for this input's position
    #[serde(default)]
    pub signature: Bytes,
}

impl TxInput {
    pub fn output_id(&self) -> OutputId {
        OutputId::new(self.prev_tx_hash, self.output_index)
    }
}

/// Transaction output. Once minted into the pool this is also the
/// spendable output record: whoever controls `owner` may spend `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Amount,
    pub owner: Address,
}

impl TxOutput {
    pub fn new(value: Amount, owner: Address) -> Self {
        Self { value, owner }
    }

    fn encode_into(&self, data: &mut Vec<u8>) {
        data.extend_from_slice(&self.value.to_be_bytes());
        data.extend_from_slice(self.owner.as_bytes());
    }
}

/// Value-transfer transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Content hash, assigned by `finalize` once inputs, outputs and signatures are set
    #[serde(default)]
    pub hash: H256,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, prev_tx_hash: H256, output_index: u32) -> &mut Self {
        self.inputs.push(TxInput {
            prev_tx_hash,
            output_index,
            signature: Bytes::default(),
        });
        self
    }

    pub fn add_output(&mut self, value: Amount, owner: Address) -> &mut Self {
        self.outputs.push(TxOutput::new(value, owner));
        self
    }

    /// Attach the signature for the input at `index`. Out-of-range positions are ignored.
    pub fn set_signature(&mut self, index: usize, signature: impl Into<Bytes>) -> &mut Self {
        if let Some(input) = self.inputs.get_mut(index) {
            input.signature = signature.into();
        }
        self
    }

    /// The exact bytes the signature of input `index` must cover.
    ///
    /// Layout: prev tx hash (32) | output index (u32 BE) | every output as
    /// value (i64 BE) | owner (20). A signature is therefore bound to its own
    /// input position and to the full, current output list.
    pub fn raw_data_to_sign(&self, index: usize) -> Option<Vec<u8>> {
        let input = self.inputs.get(index)?;
        let mut data = Vec::with_capacity(36 + self.outputs.len() * 28);
        data.extend_from_slice(input.prev_tx_hash.as_bytes());
        data.extend_from_slice(&input.output_index.to_be_bytes());
        for output in &self.outputs {
            output.encode_into(&mut data);
        }
        Some(data)
    }

    /// Full encoding including signatures, the preimage of the content hash.
    pub fn raw_tx(&self) -> Vec<u8> {
        let mut data = Vec::new();
        for input in &self.inputs {
            data.extend_from_slice(input.prev_tx_hash.as_bytes());
            data.extend_from_slice(&input.output_index.to_be_bytes());
            data.extend_from_slice(&input.signature);
        }
        for output in &self.outputs {
            output.encode_into(&mut data);
        }
        data
    }

    /// Compute and store the content hash
    pub fn finalize(&mut self) -> H256 {
        self.hash = H256::from(keccak256(self.raw_tx()));
        self.hash
    }

    /// Output ids this transaction mints once applied
    pub fn minted_ids(&self) -> impl Iterator<Item = (OutputId, &TxOutput)> + '_ {
        self.outputs
            .iter()
            .enumerate()
            .map(|(i, output)| (OutputId::new(self.hash, i as u32), output))
    }
}

/// Why a transaction was rejected. The first violated rule wins: inputs are
/// checked in order, then outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum InvalidTransaction {
    #[error("output {0} is claimed more than once")]
    DoubleClaim(OutputId),
    #[error("output {0} is not in the unspent pool")]
    UnknownOutput(OutputId),
    #[error("signature of input {input} does not verify")]
    BadSignature { input: usize },
    #[error("output {output} has a negative value")]
    NegativeOutput { output: usize },
    #[error("outputs total {outputs} but inputs only {inputs}")]
    ValueNotConserved { inputs: AmountSum, outputs: AmountSum },
}

/// Why a candidate was left out of an epoch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    Invalid(InvalidTransaction),
    /// Beyond the configured epoch size, never validated
    OverCapacity,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Invalid(reason) => write!(f, "{}", reason),
            RejectReason::OverCapacity => write!(f, "epoch is full"),
        }
    }
}

/// A candidate that was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Position of the candidate in the submitted sequence
    pub position: usize,
    pub tx_hash: H256,
    pub reason: RejectReason,
}

/// Result of applying one ordered batch of candidates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EpochOutcome {
    /// Accepted candidates, in submission order
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<Rejection>,
    /// Value destroyed by accepted transactions (inputs minus outputs)
    pub fees: AmountSum,
}
