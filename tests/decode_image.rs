mod common;

use common::*;
use fat_explorer::filesystem::fat_entry::FatEntryStatus;
use fat_explorer::filesystem::fat_error::ErrorKind;
use fat_explorer::{DecodeOptions, DirectoryTree, FATError, NodeId, decode, decode_with};
use std::io::Cursor;

fn names(tree: &DirectoryTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .filter_map(|&child| tree.record(child))
        .map(|record| record.display_name().to_string())
        .collect()
}

#[test]
fn test_geometry_of_built_image() {
    let (volume, _) = decode(Cursor::new(ImageBuilder::new().build())).unwrap();
    let bpb = volume.bpb();

    assert_eq!(bpb.bytes_per_sec(), 512);
    assert_eq!(bpb.root_clus(), ROOT_CLUSTER);
    assert_eq!(bpb.data_region_start(), DATA_START as u64);
    assert_eq!(bpb.first_sector_of_cluster(2), Some(bpb.data_region_start()));
    assert_eq!(bpb.first_sector_of_cluster(3), Some(DATA_START as u64 + 1));
    assert_eq!(bpb.first_sector_of_cluster(1), None);
    assert_eq!(bpb.cluster_count(), CLUSTER_CNT as u32);
}

#[test]
fn test_empty_root() {
    let (_, tree) = decode(Cursor::new(ImageBuilder::new().build())).unwrap();

    assert!(tree.is_empty());
    assert!(tree.children(tree.root()).is_empty());
}

#[test]
fn test_nested_directory() {
    let (mut volume, tree) = decode(Cursor::new(sub_image().build())).unwrap();
    let root = tree.root();

    assert_eq!(names(&tree, root), vec!["SUB"]);
    let sub = tree.find_child(root, "SUB").unwrap();
    assert!(tree.node(sub).is_directory());
    assert_eq!(tree.parent(sub), Some(root));
    assert_eq!(names(&tree, sub), vec![".", "..", "A.TXT"]);

    // Dot entries are recorded but not expanded.
    let dot = tree.find_child(sub, ".").unwrap();
    let dotdot = tree.find_child(sub, "..").unwrap();
    assert!(tree.children(dot).is_empty());
    assert!(tree.children(dotdot).is_empty());

    let file = tree.find_child(sub, "A.TXT").unwrap();
    assert!(!tree.node(file).is_directory());
    let record = tree.record(file).unwrap().clone();
    assert_eq!(record.first_cluster(), 4);
    assert_eq!(record.file_size(), 5);
    assert_eq!(volume.extract(&record).unwrap(), b"hello");
}

#[test]
fn test_long_file_name() {
    let mut img = ImageBuilder::new();
    img.write_chain(
        &[2],
        &long_name_entries("LONGFILENAME12", file_entry(b"LONGFI~1TXT", 3, 4)),
    );
    img.write_chain(&[3], b"data");

    let (mut volume, tree) = decode(Cursor::new(img.build())).unwrap();
    let children = tree.children(tree.root());
    assert_eq!(children.len(), 1);

    let record = tree.record(children[0]).unwrap().clone();
    assert_eq!(record.name(), "LONGFI~1.TXT");
    assert_eq!(record.full_name(), Some("LONGFILENAME12"));
    assert_eq!(tree.find_child(tree.root(), "LONGFI~1.TXT"), Some(children[0]));
    assert_eq!(tree.find_child(tree.root(), "LONGFILENAME12"), Some(children[0]));
    assert_eq!(volume.extract(&record).unwrap(), b"data");
}

#[test]
fn test_fragmented_file() {
    let content: Vec<u8> = (0..1200u32).map(|i| (i % 251) as u8).collect();
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &file_entry(b"BIG     BIN", 5, content.len() as u32));
    img.write_chain(&[5, 9, 7], &content);

    let (mut volume, tree) = decode(Cursor::new(img.build())).unwrap();
    let record = tree.record(tree.children(tree.root())[0]).unwrap().clone();

    assert_eq!(volume.chain_for(5).unwrap(), vec![5, 9, 7]);
    assert_eq!(volume.extract(&record).unwrap(), content);
}

#[test]
fn test_root_spanning_clusters() {
    let mut entries: Vec<Vec<u8>> = (0..16)
        .map(|i| {
            let name = format!("F{i:02}        ");
            file_entry(name.as_bytes().try_into().unwrap(), 0, 0)
        })
        .collect();
    entries.push(file_entry(b"LAST    TXT", 0, 0));

    let mut img = ImageBuilder::new();
    img.write_chain(&[2, 10], &directory(&entries));

    let (_, tree) = decode(Cursor::new(img.build())).unwrap();
    let names = names(&tree, tree.root());

    assert_eq!(names.len(), 17);
    assert_eq!(names[0], "F00");
    assert_eq!(names[16], "LAST.TXT");
}

#[test]
fn test_deleted_and_end_marker() {
    let mut deleted = file_entry(b"GONE    TXT", 0, 0);
    deleted[0] = 0xE5;
    let hidden = file_entry(b"HIDDEN  TXT", 0, 0);

    let mut img = ImageBuilder::new();
    img.write_chain(
        &[2],
        &directory(&[
            deleted,
            file_entry(b"KEPT    TXT", 0, 0),
            vec![0u8; 32],
            hidden,
        ]),
    );

    let (_, tree) = decode(Cursor::new(img.build())).unwrap();
    assert_eq!(names(&tree, tree.root()), vec!["KEPT.TXT"]);
}

#[test]
fn test_empty_file_without_cluster() {
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &file_entry(b"EMPTY      ", 0, 0));

    let (mut volume, tree) = decode(Cursor::new(img.build())).unwrap();
    let record = tree.record(tree.children(tree.root())[0]).unwrap().clone();

    assert!(volume.extract(&record).unwrap().is_empty());
}

#[test]
fn test_chain_too_short() {
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &file_entry(b"SHORT   BIN", 3, 2000));
    img.write_chain(&[3], &[0xAB; 512]);

    let (mut volume, tree) = decode(Cursor::new(img.build())).unwrap();
    let record = tree.record(tree.children(tree.root())[0]).unwrap().clone();

    let err = volume.extract(&record).unwrap_err();
    assert!(matches!(
        err,
        FATError::ChainTooShort {
            declared: 2000,
            available: 512
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Chain);
}

#[test]
fn test_dangling_file_chain() {
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &file_entry(b"LOST    BIN", 3, 100));
    img.write_chain(&[3], &[1; 100]);
    img.set_fat(3, 0);

    let (mut volume, tree) = decode(Cursor::new(img.build())).unwrap();
    let record = tree.record(tree.children(tree.root())[0]).unwrap().clone();

    assert!(matches!(
        volume.extract(&record),
        Err(FATError::DanglingCluster(3))
    ));
}

#[test]
fn test_bad_cluster_in_chain() {
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &file_entry(b"BAD     BIN", 3, 1000));
    img.write_chain(&[3, 4], &[1; 1000]);
    img.set_fat(3, 0x0FFF_FFF7);

    let (mut volume, tree) = decode(Cursor::new(img.build())).unwrap();
    let record = tree.record(tree.children(tree.root())[0]).unwrap().clone();

    assert!(matches!(
        volume.extract(&record),
        Err(FATError::InvalidChainLink {
            value: 0x0FFF_FFF7,
            status: FatEntryStatus::Bad
        })
    ));
}

#[test]
fn test_cluster_loop() {
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &file_entry(b"LOOP    BIN", 3, 100));
    img.write_chain(&[3], &[1; 100]);
    img.set_fat(3, 4).set_fat(4, 3);

    let (mut volume, tree) = decode(Cursor::new(img.build())).unwrap();
    let record = tree.record(tree.children(tree.root())[0]).unwrap().clone();

    assert!(matches!(volume.extract(&record), Err(FATError::ClusterLoop(_))));
}

#[test]
fn test_dangling_root() {
    let mut img = ImageBuilder::new();
    img.set_fat(ROOT_CLUSTER, 0);

    assert!(matches!(
        decode(Cursor::new(img.build())),
        Err(FATError::DanglingCluster(2))
    ));
}

#[test]
fn test_directory_cycle() {
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &dir_entry(b"SUB        ", 3));
    img.write_chain(
        &[3],
        &directory(&[dot_entries(3, 0), dir_entry(b"BACK       ", 2)]),
    );

    let err = decode(Cursor::new(img.build())).unwrap_err();
    assert!(matches!(err, FATError::DirectoryCycle(2)));
    assert_eq!(err.kind(), ErrorKind::Chain);
}

#[test]
fn test_high_cluster_word() {
    // High word 1, low word 4: cluster 0x10004 is beyond the volume unless the high word
    // is ignored.
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &file_entry(b"HIGH    TXT", 0x0001_0004, 3));
    img.write_chain(&[4], b"abc");
    let bytes = img.build();

    let (mut volume, tree) = decode(Cursor::new(bytes.clone())).unwrap();
    let record = tree.record(tree.children(tree.root())[0]).unwrap().clone();
    assert_eq!(record.first_cluster(), 0x0001_0004);
    assert!(volume.extract(&record).is_err());

    let (mut volume, tree) = decode_with(Cursor::new(bytes), DecodeOptions::compat()).unwrap();
    let record = tree.record(tree.children(tree.root())[0]).unwrap().clone();
    assert_eq!(record.first_cluster(), 4);
    assert_eq!(volume.extract(&record).unwrap(), b"abc");
}

#[test]
fn test_reserved_fat_bits_are_masked() {
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &file_entry(b"MASK    BIN", 3, 1000));
    img.write_chain(&[3, 4], &[7; 1000]);
    img.set_fat(3, 0xF000_0004);

    let (mut volume, tree) = decode(Cursor::new(img.build())).unwrap();
    let record = tree.record(tree.children(tree.root())[0]).unwrap().clone();

    assert_eq!(volume.chain_for(3).unwrap(), vec![3, 4]);
    assert_eq!(volume.extract(&record).unwrap(), vec![7u8; 1000]);
}

#[test]
fn test_truncated_boot_sector() {
    let err = decode(Cursor::new(vec![0u8; 100])).unwrap_err();
    assert!(matches!(err, FATError::FormatError(_)));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_zero_geometry() {
    let mut bytes = ImageBuilder::new().build();
    bytes[13] = 0;

    let err = decode(Cursor::new(bytes)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_cluster_past_end_of_stream() {
    let mut bytes = sub_image().build();
    bytes.truncate((DATA_START + 2) * BYTES_PER_SEC);

    let (mut volume, tree) = decode(Cursor::new(bytes)).unwrap();
    let sub = tree.find_child(tree.root(), "SUB").unwrap();
    let file = tree.find_child(sub, "A.TXT").unwrap();
    let record = tree.record(file).unwrap().clone();

    let err = volume.extract(&record).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_fat_larger_than_stream() {
    let mut bytes = ImageBuilder::new().build();
    bytes[16] = 1;
    bytes[32..36].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    bytes[36..40].copy_from_slice(&0x7FFF_FFFFu32.to_le_bytes());

    let err = decode(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, FATError::IOError(_)));
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_long_chain_of_huge_clusters() {
    // 65024-byte sectors, 255 sectors per cluster, one reserved sector and one FAT
    // sector: the stream ends where the data region starts.
    let bytes_per_sec = 0xFE00usize;
    let mut bytes = vec![0u8; 2 * bytes_per_sec];
    bytes[0..3].copy_from_slice(&[0xEB, 0x58, 0x90]);
    bytes[11..13].copy_from_slice(&(bytes_per_sec as u16).to_le_bytes());
    bytes[13] = 255;
    bytes[14..16].copy_from_slice(&1u16.to_le_bytes());
    bytes[16] = 1;
    bytes[32..36].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    bytes[36..40].copy_from_slice(&1u32.to_le_bytes());
    bytes[44..48].copy_from_slice(&ROOT_CLUSTER.to_le_bytes());
    bytes[510] = 0x55;
    bytes[511] = 0xAA;

    // Root chain 2 -> 3 -> ... -> 16001 -> end of chain
    let fat = bytes_per_sec;
    for cluster in 2u32..16_001 {
        let off = fat + cluster as usize * 4;
        bytes[off..off + 4].copy_from_slice(&(cluster + 1).to_le_bytes());
    }
    let off = fat + 16_001 * 4;
    bytes[off..off + 4].copy_from_slice(&EOC.to_le_bytes());

    let err = decode(Cursor::new(bytes)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
