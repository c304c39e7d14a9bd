//! Binary codec and response decoders
//!
//! Counterparties return hex encoded transactions and outputs in the
//! legacy (non-segwit) serialization. Decoding is a single fail-fast pass:
//! hex decode, deserialize, validate. The first failure ends the operation.

use crate::types::{PaymentDestinationResponse, PaymentRequest, PaymentRequestResponse};
use crate::{BsvaliasError, Result};
use bitcoin::consensus::encode::{deserialize, deserialize_partial, serialize};
use bitcoin::{absolute, transaction, ScriptBuf, Transaction, TxIn, TxOut};

/// Protocol version of the output serialization this protocol uses
pub const OUTPUT_PROTOCOL_VERSION: u32 = 1;

/// Transaction version variant of the output serialization this protocol uses
pub const OUTPUT_TX_VERSION: u32 = 1;

/// Deserialize a transaction in the non-segwit layout. A zero input count
/// is read as an empty input list, never as a segwit marker, so templates
/// without inputs decode.
pub fn deserialize_transaction(bytes: &[u8]) -> Result<Transaction> {
    let err = |e: bitcoin::consensus::encode::Error| BsvaliasError::format("deserialize tx", e);

    let (version, mut read) = deserialize_partial::<transaction::Version>(bytes).map_err(err)?;
    let (input, n) = deserialize_partial::<Vec<TxIn>>(&bytes[read..]).map_err(err)?;
    read += n;
    let (output, n) = deserialize_partial::<Vec<TxOut>>(&bytes[read..]).map_err(err)?;
    read += n;
    let (lock_time, n) = deserialize_partial::<absolute::LockTime>(&bytes[read..]).map_err(err)?;
    read += n;

    if read != bytes.len() {
        return Err(BsvaliasError::format(
            "deserialize tx",
            format!("{} trailing bytes", bytes.len() - read),
        ));
    }

    Ok(Transaction {
        version,
        lock_time,
        input,
        output,
    })
}

/// Serialize a transaction in the non-segwit layout read by
/// [`deserialize_transaction`]. Witness data is not written.
pub fn serialize_transaction(tx: &Transaction) -> Vec<u8> {
    let mut bytes = serialize(&tx.version);
    bytes.extend(serialize(&tx.input));
    bytes.extend(serialize(&tx.output));
    bytes.extend(serialize(&tx.lock_time));
    bytes
}

/// Deserialize a single transaction output under the given encoding
/// parameters. Only the protocol's own encoding is supported.
pub fn deserialize_output(bytes: &[u8], protocol_version: u32, tx_version: u32) -> Result<TxOut> {
    if protocol_version != OUTPUT_PROTOCOL_VERSION || tx_version != OUTPUT_TX_VERSION {
        return Err(BsvaliasError::format(
            "deserialize output",
            format!(
                "unsupported output encoding {}/{}",
                protocol_version, tx_version
            ),
        ));
    }

    deserialize::<TxOut>(bytes).map_err(|e| BsvaliasError::format("deserialize output", e))
}

/// Decode a payment destination response into its locking script
pub fn decode_payment_destination(response: &PaymentDestinationResponse) -> Result<ScriptBuf> {
    let script =
        hex::decode(&response.output).map_err(|e| BsvaliasError::format("parse script hex", e))?;

    if script.is_empty() {
        return Err(BsvaliasError::empty_result("locking script"));
    }

    Ok(ScriptBuf::from_bytes(script))
}

/// Decode a payment request response. The transaction is decoded before any
/// output is looked at; outputs keep the order the service sent them in.
pub fn decode_payment_request(response: &PaymentRequestResponse) -> Result<PaymentRequest> {
    let tx_bytes = hex::decode(&response.payment_request)
        .map_err(|e| BsvaliasError::format("parse tx hex", e))?;
    let tx = deserialize_transaction(&tx_bytes)?;

    if response.outputs.is_empty() {
        return Err(BsvaliasError::empty_result("payment request outputs"));
    }

    let outputs = response
        .outputs
        .iter()
        .map(|output_hex| {
            let bytes = hex::decode(output_hex)
                .map_err(|e| BsvaliasError::format("parse output hex", e))?;
            deserialize_output(&bytes, OUTPUT_PROTOCOL_VERSION, OUTPUT_TX_VERSION)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PaymentRequest { tx, outputs })
}
