//! Contract artifacts and ABI call encoding
//!
//! Artifacts come from the contract build pipeline either as a bare ABI
//! array or as a Hardhat-style object carrying the ABI next to the creation
//! bytecode; both forms are accepted.

use crate::error::{SubmitterError, SubmitterResult};

use ethers::abi::{Abi, Token};
use ethers::types::{Address, Bytes};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Hardhat artifact object; fields beyond these are ignored
#[derive(Deserialize)]
struct HardhatArtifact {
    abi: Abi,
    #[serde(default)]
    bytecode: Option<String>,
}

/// Parsed contract build artifact
#[derive(Debug)]
pub struct ContractArtifact {
    pub abi: Abi,
    bytecode: Option<Bytes>,
}

impl ContractArtifact {
    /// Load an artifact from a JSON file
    pub fn load(path: &Path) -> SubmitterResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SubmitterError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Parse an artifact from JSON text
    pub fn from_json(raw: &str) -> SubmitterResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| SubmitterError::Config(format!("artifact is not valid JSON: {e}")))?;

        match value {
            Value::Array(_) => {
                let abi = serde_json::from_value(value)
                    .map_err(|e| SubmitterError::Config(format!("malformed ABI: {e}")))?;
                Ok(Self {
                    abi,
                    bytecode: None,
                })
            }
            Value::Object(_) => {
                let artifact: HardhatArtifact = serde_json::from_value(value)
                    .map_err(|e| SubmitterError::Config(format!("malformed artifact: {e}")))?;

                let bytecode = match artifact.bytecode.as_deref() {
                    Some(hex_str) => parse_bytecode(hex_str)?,
                    None => None,
                };

                Ok(Self {
                    abi: artifact.abi,
                    bytecode,
                })
            }
            _ => Err(SubmitterError::Config(
                "artifact must be an ABI array or an artifact object".to_string(),
            )),
        }
    }

    /// Creation bytecode, required for deployment
    pub fn bytecode(&self) -> SubmitterResult<Bytes> {
        self.bytecode.clone().ok_or_else(|| {
            SubmitterError::Config("artifact carries no creation bytecode".to_string())
        })
    }
}

/// A deployed contract: its address plus callable interface
pub struct ContractReference {
    pub address: Address,
    abi: Abi,
}

impl ContractReference {
    pub fn new(address: Address, abi: Abi) -> Self {
        Self { address, abi }
    }

    /// Encode a method call into calldata (selector + ABI-encoded arguments)
    pub fn encode_call(&self, method: &str, args: &[Token]) -> SubmitterResult<Bytes> {
        let function = self.abi.function(method).map_err(|_| {
            SubmitterError::Encoding(format!("method {method} not found in ABI"))
        })?;

        let data = function
            .encode_input(args)
            .map_err(|e| SubmitterError::Encoding(format!("{method}: {e}")))?;

        Ok(data.into())
    }
}

// Interface-only artifacts carry "0x" as bytecode.
fn parse_bytecode(hex_str: &str) -> SubmitterResult<Option<Bytes>> {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if stripped.is_empty() {
        return Ok(None);
    }

    let decoded = hex::decode(stripped)
        .map_err(|e| SubmitterError::Config(format!("malformed bytecode: {e}")))?;
    Ok(Some(decoded.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINT_ABI: &str = r#"[
        {
            "name": "mintNFT",
            "type": "function",
            "stateMutability": "nonpayable",
            "inputs": [
                {"name": "recipient", "type": "address"},
                {"name": "tokenURI", "type": "string"}
            ],
            "outputs": [{"name": "", "type": "uint256"}]
        }
    ]"#;

    fn mint_reference() -> ContractReference {
        let artifact = ContractArtifact::from_json(MINT_ABI).unwrap();
        ContractReference::new(Address::repeat_byte(0x42), artifact.abi)
    }

    fn mint_args() -> Vec<Token> {
        vec![
            Token::Address(Address::repeat_byte(0x11)),
            Token::String("ipfs://QmQEoEzxrxNMA48N5Cy9G6LM4TBq58fUgRJ2TQk6xMxJ4R".to_string()),
        ]
    }

    #[test]
    fn encoded_call_round_trips_through_abi_decoding() {
        let reference = mint_reference();
        let args = mint_args();

        let data = reference.encode_call("mintNFT", &args).unwrap();

        let function = reference.abi.function("mintNFT").unwrap();
        assert_eq!(&data[..4], function.short_signature());
        let decoded = function.decode_input(&data[4..]).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn unknown_method_is_an_encoding_error() {
        let reference = mint_reference();
        let err = reference.encode_call("burnNFT", &mint_args()).unwrap_err();
        assert!(matches!(err, SubmitterError::Encoding(_)));
    }

    #[test]
    fn argument_arity_mismatch_is_an_encoding_error() {
        let reference = mint_reference();
        let err = reference
            .encode_call("mintNFT", &[Token::String("ipfs://only-one".to_string())])
            .unwrap_err();
        assert!(matches!(err, SubmitterError::Encoding(_)));
    }

    #[test]
    fn hardhat_artifact_yields_abi_and_bytecode() {
        let raw = format!(r#"{{"abi": {MINT_ABI}, "bytecode": "0x6080604052"}}"#);
        let artifact = ContractArtifact::from_json(&raw).unwrap();
        assert!(artifact.abi.function("mintNFT").is_ok());
        assert_eq!(
            artifact.bytecode().unwrap(),
            Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52])
        );
    }

    #[test]
    fn bare_abi_array_has_no_bytecode() {
        let artifact = ContractArtifact::from_json(MINT_ABI).unwrap();
        assert!(matches!(
            artifact.bytecode(),
            Err(SubmitterError::Config(_))
        ));
    }

    #[test]
    fn empty_bytecode_marker_counts_as_absent() {
        let raw = format!(r#"{{"abi": {MINT_ABI}, "bytecode": "0x"}}"#);
        let artifact = ContractArtifact::from_json(&raw).unwrap();
        assert!(artifact.bytecode().is_err());
    }

    #[test]
    fn artifact_without_abi_field_is_rejected() {
        let err = ContractArtifact::from_json(r#"{"bytecode": "0x00"}"#).unwrap_err();
        assert!(matches!(err, SubmitterError::Config(_)));
    }

    #[test]
    fn loads_artifact_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINT_ABI.as_bytes()).unwrap();

        let artifact = ContractArtifact::load(file.path()).unwrap();
        assert!(artifact.abi.function("mintNFT").is_ok());
    }
}
