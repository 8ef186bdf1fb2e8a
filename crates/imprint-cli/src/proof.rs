//! # Proof CLI: disclose and verify.
//!
//! `disclose` reads a private fingerprint file and emits a proof revealing
//! the requested paths. `verify` checks a proof against a published
//! imprint and exits 0 when it holds, 2 when it does not.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use imprint_core::Imprint;
use imprint_crypto::{disclose, verify, DisclosureProof, Fingerprint};
use imprint_schema::PropertyPath;

use crate::{emit, load_schema, read_json};

/// Exit code for a well-formed proof that does not match the imprint.
pub const EXIT_PROOF_INVALID: u8 = 2;

/// Disclose subcommand arguments.
#[derive(Args, Debug)]
pub struct DiscloseArgs {
    /// Private fingerprint file written by `imprint fingerprint`.
    #[arg(long)]
    pub fingerprint: PathBuf,

    /// Dotted path to reveal; a group path reveals every leaf under it.
    #[arg(long = "reveal", value_name = "PATH")]
    pub reveal: Vec<String>,

    /// Write the proof here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Verify subcommand arguments.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Schema file (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    /// Proof file written by `imprint disclose`.
    #[arg(long)]
    pub proof: PathBuf,

    /// Published imprint, with or without `0x`.
    #[arg(long)]
    pub imprint: String,
}

/// Execute the disclose subcommand.
pub fn run_disclose(args: &DiscloseArgs) -> Result<u8> {
    let fingerprint: Fingerprint = read_json(&args.fingerprint)?;
    if !fingerprint.is_consistent() {
        bail!(
            "fingerprint {} is corrupt: leaf hashes do not match its imprint",
            args.fingerprint.display()
        );
    }
    let paths: Vec<PropertyPath> = args.reveal.iter().map(|p| PropertyPath::from_dotted(p)).collect();
    let proof = disclose(&fingerprint, &paths).context("disclosure failed")?;
    tracing::info!(
        revealed = proof.revealed.len(),
        siblings = proof.siblings.len(),
        "proof built"
    );
    emit(&proof.to_json()?, args.out.as_deref())?;
    Ok(0)
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let schema = load_schema(&args.schema)?;
    let content = std::fs::read_to_string(&args.proof)
        .with_context(|| format!("failed to read proof: {}", args.proof.display()))?;
    let proof = DisclosureProof::from_json(&content)
        .with_context(|| format!("malformed proof: {}", args.proof.display()))?;
    let imprint = Imprint::from_hex(&args.imprint)
        .with_context(|| format!("invalid imprint: {}", args.imprint))?;

    let valid = verify(&proof, &imprint, &schema).context("proof is malformed")?;
    if valid {
        println!("VALID");
        for leaf in &proof.revealed {
            println!("  {} = {}", leaf.path, display_value(&leaf.value));
        }
        Ok(0)
    } else {
        println!("INVALID");
        Ok(EXIT_PROOF_INVALID)
    }
}

fn display_value(value: &imprint_core::LeafValue) -> String {
    match value {
        imprint_core::LeafValue::String(s) => format!("{s:?}"),
        imprint_core::LeafValue::Bytes(b) => format!("0x{}", hex_prefix(b)),
        imprint_core::LeafValue::Number(n) => n.to_string(),
    }
}

/// Hex of at most the first 16 bytes, with an ellipsis when truncated.
fn hex_prefix(bytes: &[u8]) -> String {
    let shown = hex::encode(&bytes[..bytes.len().min(16)]);
    if bytes.len() > 16 {
        format!("{shown}… ({} bytes)", bytes.len())
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{run_fingerprint, FingerprintArgs};

    const SCHEMA: &str = r#"
name: artwork
properties:
  - name: name
    kind: string
  - name: image
    kind: bytes
  - name: description
    kind: string
"#;

    const RECORD: &str = r#"{
        "name": "Lighthouse Watercolor",
        "image": "0x89504e470d0a1a0a",
        "description": "Harbor at dusk"
    }"#;

    struct Files {
        _dir: tempfile::TempDir,
        schema: PathBuf,
        record: PathBuf,
        fingerprint: PathBuf,
        proof: PathBuf,
    }

    fn files() -> Files {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("artwork.yaml");
        let record = dir.path().join("record.json");
        std::fs::write(&schema, SCHEMA).unwrap();
        std::fs::write(&record, RECORD).unwrap();
        Files {
            schema,
            record,
            fingerprint: dir.path().join("fp.json"),
            proof: dir.path().join("proof.json"),
            _dir: dir,
        }
    }

    fn fingerprint(f: &Files) -> Fingerprint {
        run_fingerprint(&FingerprintArgs {
            schema: f.schema.clone(),
            record: f.record.clone(),
            out: f.fingerprint.clone(),
        })
        .unwrap();
        read_json(&f.fingerprint).unwrap()
    }

    #[test]
    fn disclose_then_verify_round_trip() {
        let f = files();
        let fp = fingerprint(&f);
        assert!(fp.is_consistent());

        run_disclose(&DiscloseArgs {
            fingerprint: f.fingerprint.clone(),
            reveal: vec!["name".into(), "image".into()],
            out: Some(f.proof.clone()),
        })
        .unwrap();

        let verify_with = |imprint: String| {
            run_verify(&VerifyArgs {
                schema: f.schema.clone(),
                proof: f.proof.clone(),
                imprint,
            })
            .unwrap()
        };
        assert_eq!(verify_with(fp.imprint.to_prefixed_hex()), 0);
        assert_eq!(verify_with(fp.imprint.to_hex()), 0);
        assert_eq!(verify_with(format!("{:064x}", 1)), EXIT_PROOF_INVALID);
    }

    #[test]
    fn disclose_rejects_tampered_fingerprint() {
        let f = files();
        let mut fp = fingerprint(&f);
        fp.leaves[0].value = imprint_core::LeafValue::String("Forgery".into());
        std::fs::write(&f.fingerprint, serde_json::to_string(&fp).unwrap()).unwrap();

        let err = run_disclose(&DiscloseArgs {
            fingerprint: f.fingerprint.clone(),
            reveal: vec!["name".into()],
            out: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn unknown_reveal_path_is_an_error() {
        let f = files();
        fingerprint(&f);
        assert!(run_disclose(&DiscloseArgs {
            fingerprint: f.fingerprint.clone(),
            reveal: vec!["provenance".into()],
            out: Some(f.proof.clone()),
        })
        .is_err());
    }

    #[test]
    fn long_bytes_are_truncated_for_display() {
        assert_eq!(hex_prefix(&[0xde, 0xad]), "dead");
        assert!(hex_prefix(&[0u8; 40]).ends_with("(40 bytes)"));
    }
}
