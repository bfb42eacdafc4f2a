//! End-to-end pack/unpack tests for DAT archives

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::Cursor;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use zwei_dat::{
    ArchivePlan, Candidate, DatArchive, DatError, DatReader, DatWriter, ValidationError,
    write_archive,
};

fn encode(plan: &mut ArchivePlan) -> (DatArchive, Vec<u8>) {
    let archive = plan.layout().expect("layout");
    let mut writer = DatWriter::new(Cursor::new(Vec::new()));
    writer.encode(&archive, plan).expect("encode");
    (archive, writer.into_inner().into_inner())
}

#[test]
fn round_trip_preserves_structure_and_bytes() {
    let files: Vec<(&str, Vec<u8>)> = vec![
        ("title.bmp", (0..=255u8).collect()),
        ("stage1.map", b"map data".to_vec()),
        ("empty.txt", Vec::new()),
        ("stage2.map", vec![0xAB; 1000]),
        ("readme.txt", b"Zwei!!".to_vec()),
    ];

    let (mut plan, rejections) = ArchivePlan::from_candidates(
        files
            .iter()
            .map(|(name, bytes)| Candidate::from_bytes(name, bytes.clone())),
    );
    assert!(rejections.is_empty());

    let (archive, bytes) = encode(&mut plan);
    let mut reader = DatReader::open(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.archive(), &archive);

    let extensions: Vec<_> = archive.groups.iter().map(|g| g.extension.as_str()).collect();
    assert_eq!(extensions, vec!["bmp", "map", "txt"]);

    for (name, original) in &files {
        let extracted = reader.extract_by_name(name).unwrap().unwrap();
        assert_eq!(&extracted, original, "payload of {name}");
    }
}

#[test]
fn invalid_candidates_do_not_stop_the_batch() {
    let (mut plan, rejections) = ArchivePlan::from_candidates([
        Candidate::from_bytes("toolongname.ext", b"x".to_vec()),
        Candidate::from_bytes("good.ext", b"kept".to_vec()),
        Candidate::from_bytes("bad.ex", b"x".to_vec()),
        Candidate::from_bytes("a.b.ext", b"x".to_vec()),
    ]);

    let errors: Vec<_> = rejections.iter().map(|r| r.error.clone()).collect();
    assert_eq!(
        errors,
        vec![
            ValidationError::NameLength(11),
            ValidationError::ExtensionLength(2),
            ValidationError::EmbeddedDot,
        ]
    );

    let (_, bytes) = encode(&mut plan);
    let archive = DatArchive::parse(&bytes).unwrap();
    assert_eq!(archive.member_count(), 1);
    assert_eq!(archive.groups[0].members[0].name, "good");
}

#[test]
fn wrong_magic_is_a_format_error() {
    let (mut plan, _) = ArchivePlan::from_candidates([Candidate::from_bytes("a.txt", b"a".to_vec())]);
    let (_, mut bytes) = encode(&mut plan);
    bytes[0] ^= 0xFF;

    let err = DatArchive::parse(&bytes).unwrap_err();
    assert!(matches!(err, DatError::InvalidMagic(_)));
    assert!(err.is_format_error());
    assert!(DatReader::open(Cursor::new(bytes)).is_err());
}

#[test]
fn file_round_trip_with_extract_all() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir(&input).unwrap();
    std::fs::write(input.join("ALPHA.TXT"), b"first").unwrap();
    std::fs::write(input.join("beta.txt"), b"second").unwrap();
    std::fs::write(input.join("gamma.wav"), vec![9u8; 300]).unwrap();

    let mut paths: Vec<_> = std::fs::read_dir(&input)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    paths.sort();

    let (mut plan, rejections) =
        ArchivePlan::from_candidates(paths.iter().map(|p| Candidate::from_path(p).unwrap()));
    assert!(rejections.is_empty());

    let archive_path = dir.path().join("input.dat");
    write_archive(&mut plan, &archive_path).unwrap();

    let out = dir.path().join("out");
    let mut reader = DatReader::open(std::fs::File::open(&archive_path).unwrap()).unwrap();
    let written = reader.extract_all(&out).unwrap();
    assert_eq!(written.len(), 3);

    assert_eq!(std::fs::read(out.join("alpha.txt")).unwrap(), b"first");
    assert_eq!(std::fs::read(out.join("beta.txt")).unwrap(), b"second");
    assert_eq!(std::fs::read(out.join("gamma.wav")).unwrap(), vec![9u8; 300]);
}

fn member_name() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,8}"
}

fn extension() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("txt".to_string()),
        Just("bmp".to_string()),
        Just("map".to_string()),
        Just("wav".to_string()),
    ]
}

proptest! {
    #[test]
    fn decode_reproduces_encoded_archive(
        files in prop::collection::vec(
            (member_name(), extension(), prop::collection::vec(any::<u8>(), 0..64)),
            0..24,
        )
    ) {
        let (mut plan, rejections) = ArchivePlan::from_candidates(
            files
                .iter()
                .map(|(name, ext, bytes)| Candidate::from_bytes(&format!("{name}.{ext}"), bytes.clone())),
        );
        prop_assert!(rejections.is_empty());

        let (archive, bytes) = encode(&mut plan);
        prop_assert_eq!(bytes.len() as u64, archive.payload_end());

        let mut reader = DatReader::open(Cursor::new(bytes)).unwrap();
        prop_assert_eq!(reader.archive(), &archive);

        for (g, group) in archive.groups.iter().enumerate() {
            for (m, member) in group.members.iter().enumerate() {
                let payload = reader.extract_member(g, m).unwrap();
                prop_assert_eq!(payload.len(), member.size as usize);
            }
        }

        // Members keep discovery order within each group
        let mut cursor = vec![0usize; archive.groups.len()];
        for (name, ext, original) in &files {
            let g = archive.groups.iter().position(|group| &group.extension == ext).unwrap();
            let member = &archive.groups[g].members[cursor[g]];
            prop_assert_eq!(&member.name, name);
            prop_assert_eq!(&reader.extract_member(g, cursor[g]).unwrap(), original);
            cursor[g] += 1;
        }
    }
}
