//! # Selective Disclosure Across Schema, Fingerprint, and Verifier
//!
//! Fingerprints records against real schemas, discloses subsets of their
//! fields, and checks the verifier accepts exactly the proofs that match
//! the published imprint. Proofs are passed through their JSON wire form
//! to mirror a holder handing a proof to a third party.

use imprint_core::{Imprint, LeafValue};
use imprint_crypto::{
    disclose, imprint, imprint_with_salts, verify, DisclosureProof, MalformedProofError, Salt,
};
use imprint_schema::{AssetRecord, Property, PropertyPath, Schema};
use proptest::prelude::*;

fn artwork_schema() -> Schema {
    Schema::new(
        "artwork",
        1,
        vec![
            Property::string("name"),
            Property::string("image"),
            Property::string("description"),
        ],
    )
}

fn lighthouse() -> AssetRecord {
    AssetRecord::new()
        .with("name", LeafValue::String("Lighthouse Watercolor".into()))
        .with(
            "image",
            LeafValue::String("https://gallery.example/lighthouse-watercolor.png".into()),
        )
        .with(
            "description",
            LeafValue::String("A lighthouse watercolor picture".into()),
        )
}

fn paths(dotted: &[&str]) -> Vec<PropertyPath> {
    dotted.iter().map(|p| PropertyPath::from_dotted(p)).collect()
}

fn over_the_wire(proof: &DisclosureProof) -> DisclosureProof {
    DisclosureProof::from_json(&proof.to_json().unwrap()).unwrap()
}

#[test]
fn lighthouse_disclosure_verifies_only_against_its_imprint() {
    let schema = artwork_schema();
    let fp = imprint(&lighthouse(), &schema).unwrap();

    let altered = lighthouse().with(
        "description",
        LeafValue::String("A lighthouse oil painting".into()),
    );
    let other = imprint(&altered, &schema).unwrap();
    assert_ne!(fp.imprint, other.imprint);

    let proof = over_the_wire(&disclose(&fp, &paths(&["name", "image"])).unwrap());
    assert_eq!(proof.revealed.len(), 2);
    assert!(proof
        .revealed
        .iter()
        .all(|leaf| leaf.path.to_string() != "description"));

    assert!(verify(&proof, &fp.imprint, &schema).unwrap());
    assert!(!verify(&proof, &other.imprint, &schema).unwrap());
}

#[test]
fn fresh_salts_hide_identical_records() {
    let schema = artwork_schema();
    let a = imprint(&lighthouse(), &schema).unwrap();
    let b = imprint(&lighthouse(), &schema).unwrap();
    assert_ne!(a.imprint, b.imprint);

    // A proof from one fingerprint says nothing about the other.
    let proof = disclose(&a, &paths(&["name"])).unwrap();
    assert!(!verify(&proof, &b.imprint, &schema).unwrap());
}

#[test]
fn fixed_salts_are_reproducible() {
    let schema = artwork_schema();
    let salts = || (0u8..3).map(|i| Salt::from_bytes([i; 32])).collect::<Vec<_>>();
    let a = imprint_with_salts(&lighthouse(), &schema, salts()).unwrap();
    let b = imprint_with_salts(&lighthouse(), &schema, salts()).unwrap();
    assert_eq!(a.imprint, b.imprint);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn tampered_value_fails_verification() {
    let schema = artwork_schema();
    let fp = imprint(&lighthouse(), &schema).unwrap();
    let mut proof = disclose(&fp, &paths(&["name"])).unwrap();
    proof.revealed[0].value = LeafValue::String("Lighthouse Oil Painting".into());
    assert!(!verify(&proof, &fp.imprint, &schema).unwrap());
}

#[test]
fn empty_disclosure_commits_to_the_root() {
    let schema = artwork_schema();
    let fp = imprint(&lighthouse(), &schema).unwrap();
    let proof = disclose(&fp, &[]).unwrap();
    assert!(proof.revealed.is_empty());
    assert_eq!(proof.siblings.len(), 1);
    assert!(verify(&proof, &fp.imprint, &schema).unwrap());
}

#[test]
fn full_disclosure_needs_no_siblings() {
    let schema = artwork_schema();
    let fp = imprint(&lighthouse(), &schema).unwrap();
    let proof = disclose(&fp, &paths(&["name", "image", "description"])).unwrap();
    assert!(proof.siblings.is_empty());
    assert!(verify(&proof, &fp.imprint, &schema).unwrap());
}

#[test]
fn nested_group_reveals_every_leaf_under_it() {
    let schema = Schema::new(
        "certificate",
        2,
        vec![
            Property::string("title"),
            Property::nested(
                "provenance",
                vec![
                    Property::string("artist"),
                    Property::number("year"),
                    Property::bytes("signature"),
                ],
            ),
            Property::number("edition"),
        ],
    );
    let record = AssetRecord::new()
        .with("title", LeafValue::String("Tidal Study".into()))
        .with(
            "provenance",
            AssetRecord::new()
                .with("artist", LeafValue::String("M. Okafor".into()))
                .with("year", LeafValue::Number(2019))
                .with("signature", LeafValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef])),
        )
        .with("edition", LeafValue::Number(7));

    let fp = imprint(&record, &schema).unwrap();
    assert_eq!(fp.leaves.len(), 5);

    let proof = over_the_wire(&disclose(&fp, &paths(&["provenance"])).unwrap());
    let revealed: Vec<String> = proof.revealed.iter().map(|l| l.path.to_string()).collect();
    assert_eq!(
        revealed,
        vec!["provenance.artist", "provenance.year", "provenance.signature"]
    );
    assert!(verify(&proof, &fp.imprint, &schema).unwrap());
}

#[test]
fn proof_against_another_schema_is_malformed() {
    let schema = artwork_schema();
    let fp = imprint(&lighthouse(), &schema).unwrap();
    let proof = disclose(&fp, &paths(&["name"])).unwrap();

    let v2 = Schema::new(
        "artwork",
        2,
        vec![
            Property::string("name"),
            Property::string("image"),
            Property::string("description"),
        ],
    );
    let err = verify(&proof, &fp.imprint, &v2).unwrap_err();
    assert!(matches!(err, MalformedProofError::SchemaMismatch { .. }));
}

#[test]
fn dropped_sibling_is_malformed() {
    let schema = artwork_schema();
    let fp = imprint(&lighthouse(), &schema).unwrap();
    let mut proof = disclose(&fp, &paths(&["name"])).unwrap();
    proof.siblings.pop();
    assert!(verify(&proof, &fp.imprint, &schema).is_err());
}

#[test]
fn record_missing_a_field_cannot_be_fingerprinted() {
    let schema = artwork_schema();
    let partial = AssetRecord::new().with("name", LeafValue::String("Untitled".into()));
    assert!(imprint(&partial, &schema).is_err());
}

#[test]
fn imprint_hex_round_trips_through_text() {
    let schema = artwork_schema();
    let fp = imprint(&lighthouse(), &schema).unwrap();
    let published = fp.imprint.to_prefixed_hex();
    assert_eq!(Imprint::from_hex(&published).unwrap(), fp.imprint);
}

// ── Property tests ───────────────────────────────────────────────────

fn wide_schema(width: usize) -> Schema {
    let properties = (0..width).map(|i| Property::string(format!("f{i}"))).collect();
    Schema::new("wide", 1, properties)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn any_subset_verifies(
        values in proptest::collection::vec("[a-z]{0,12}", 1..12),
        mask in proptest::collection::vec(any::<bool>(), 12),
    ) {
        let schema = wide_schema(values.len());
        let record = values.iter().enumerate().fold(AssetRecord::new(), |r, (i, v)| {
            r.with(format!("f{i}"), LeafValue::String(v.clone()))
        });
        let fp = imprint(&record, &schema).unwrap();

        let chosen: Vec<PropertyPath> = (0..values.len())
            .filter(|&i| mask[i])
            .map(|i| PropertyPath::from_dotted(&format!("f{i}")))
            .collect();
        let proof = over_the_wire(&disclose(&fp, &chosen).unwrap());
        prop_assert_eq!(proof.revealed.len(), chosen.len());
        prop_assert!(verify(&proof, &fp.imprint, &schema).unwrap());
    }
}
