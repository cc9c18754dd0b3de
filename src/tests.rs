//! Crate-level integration tests: whole-tree parse/write round trips and
//! the structural invariants `BoxTree::parse_file` is expected to enforce.
//! Per-module behavior (sample tables, codec recognizers, the repair
//! pipeline) has its own `#[cfg(test)]` blocks alongside the code it
//! exercises; this file is for properties that only make sense once a
//! full box forest is assembled.

#[cfg(test)]
mod tests {
    use crate::box_tree::node::BoxNode;
    use crate::box_tree::BoxTree;
    use crate::fourcc::FourCC;
    use crate::large_box::LargeBox;
    use std::io::Write;

    const MDAT_PAYLOAD: [u8; 8] = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11, 0x22];

    /// Builds a minimal but well-formed `ftyp` + `moov(mvhd)` + `mdat`
    /// tree, with the `mdat` backed by a real file holding `MDAT_PAYLOAD`,
    /// and writes it out via `BoxTree::write_file` (the same path
    /// `Repairer::commit` uses).
    fn minimal_container() -> (tempfile::NamedTempFile, tempfile::NamedTempFile) {
        let mut source = tempfile::NamedTempFile::new().unwrap();
        source.write_all(&MDAT_PAYLOAD).unwrap();

        let ftyp = BoxNode::leaf(FourCC::from_str("ftyp"), b"isom\0\0\x02\0isomiso2".to_vec());
        let mvhd = BoxNode::leaf(FourCC::from_str("mvhd"), vec![0u8; 20]);
        let moov = BoxNode::parent(FourCC::from_str("moov"), vec![mvhd]);
        let large_box = LargeBox::new(source.path(), 0, MDAT_PAYLOAD.len() as u64);
        let mdat = BoxNode::file_backed(FourCC::from_str("mdat"), large_box);

        let tree = BoxTree{roots: vec![ftyp, moov, mdat]};
        let output = tempfile::NamedTempFile::new().unwrap();
        tree.write_file(output.path()).unwrap();

        (source, output)
    }

    #[test]
    fn parses_a_well_formed_minimal_container() {
        let (_source, file) = minimal_container();
        let tree = BoxTree::parse_file(file.path()).unwrap();

        assert!(tree.find_first("ftyp").is_some());
        assert!(tree.find_first("moov").is_some());
        let mdat = tree.find_first("mdat").unwrap();
        assert_eq!(mdat.length(), 8 + MDAT_PAYLOAD.len() as u64);
    }

    #[test]
    fn rejects_a_tree_missing_moov() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&16u32.to_be_bytes());
        bytes.extend_from_slice(b"mdat");
        bytes.extend_from_slice(&[0u8; 8]);
        file.write_all(&bytes).unwrap();

        assert!(BoxTree::parse_file(file.path()).is_err());
    }

    #[test]
    fn rejects_a_tree_with_two_moov_boxes() {
        let mvhd_a = BoxNode::leaf(FourCC::from_str("mvhd"), vec![0u8; 8]);
        let moov_a = BoxNode::parent(FourCC::from_str("moov"), vec![mvhd_a]);
        let mvhd_b = BoxNode::leaf(FourCC::from_str("mvhd"), vec![0u8; 8]);
        let moov_b = BoxNode::parent(FourCC::from_str("moov"), vec![mvhd_b]);
        let source = tempfile::NamedTempFile::new().unwrap();
        let mdat = BoxNode::file_backed(FourCC::from_str("mdat"), LargeBox::new(source.path(), 0, 0));

        let tree = BoxTree{roots: vec![moov_a, moov_b, mdat]};
        let output = tempfile::NamedTempFile::new().unwrap();
        tree.write_file(output.path()).unwrap();

        assert!(BoxTree::parse_file(output.path()).is_err());
    }

    #[test]
    fn rejects_a_trailing_ftyp() {
        let mvhd = BoxNode::leaf(FourCC::from_str("mvhd"), vec![0u8; 8]);
        let moov = BoxNode::parent(FourCC::from_str("moov"), vec![mvhd]);
        let ftyp = BoxNode::leaf(FourCC::from_str("ftyp"), vec![0u8; 8]);
        let source = tempfile::NamedTempFile::new().unwrap();
        let mdat = BoxNode::file_backed(FourCC::from_str("mdat"), LargeBox::new(source.path(), 0, 0));

        // ftyp must lead; here it trails moov instead.
        let tree = BoxTree{roots: vec![moov, ftyp, mdat]};
        let output = tempfile::NamedTempFile::new().unwrap();
        tree.write_file(output.path()).unwrap();

        assert!(BoxTree::parse_file(output.path()).is_err());
    }

    #[test]
    fn write_file_round_trips_declared_lengths() {
        let (_source, file) = minimal_container();
        let mut tree = BoxTree::parse_file(file.path()).unwrap();
        tree.update_length();

        let out = tempfile::NamedTempFile::new().unwrap();
        tree.write_file(out.path()).unwrap();

        let reparsed = BoxTree::parse_file(out.path()).unwrap();
        for name in ["ftyp", "moov", "mdat"] {
            let original = tree.find_first(name).unwrap().length();
            let written = reparsed.find_first(name).unwrap().length();
            assert_eq!(original, written, "{name} length did not round-trip");
        }
    }

    #[test]
    fn prune_removes_boxes_anywhere_in_the_forest() {
        let (_source, file) = minimal_container();
        let mut tree = BoxTree::parse_file(file.path()).unwrap();

        let ctts = BoxNode::leaf(FourCC::from_str("ctts"), vec![0u8; 8]);
        tree.find_first_mut("moov").unwrap().children.push(ctts);
        assert!(tree.find_first("ctts").is_some());

        tree.prune("ctts");
        assert!(tree.find_first("ctts").is_none());
    }

    #[test]
    fn replace_mdat_swaps_the_top_level_payload() {
        let (source, file) = minimal_container();
        let mut tree = BoxTree::parse_file(file.path()).unwrap();

        let replacement = LargeBox::new(source.path(), 0, 4);
        let new_mdat = BoxNode::file_backed(FourCC::from_str("mdat"), replacement);
        tree.replace_mdat(new_mdat).unwrap();

        assert_eq!(tree.find_first("mdat").unwrap().length(), 8 + 4);
    }

    #[test]
    fn idempotent_reparse_of_its_own_output() {
        let (_source, file) = minimal_container();
        let tree = BoxTree::parse_file(file.path()).unwrap();

        let first_pass = tempfile::NamedTempFile::new().unwrap();
        tree.write_file(first_pass.path()).unwrap();

        let reparsed = BoxTree::parse_file(first_pass.path()).unwrap();
        let second_pass = tempfile::NamedTempFile::new().unwrap();
        reparsed.write_file(second_pass.path()).unwrap();

        let bytes_a = std::fs::read(first_pass.path()).unwrap();
        let bytes_b = std::fs::read(second_pass.path()).unwrap();
        assert_eq!(bytes_a, bytes_b, "re-writing an already-repaired file should be a no-op");
    }

    // --- end-to-end repair: non-zero mdat offset, co64/tkhd/mvhd coherence ---

    struct NullOracle;
    impl crate::codec::Oracle for NullOracle {
        fn probe(&self, _: &str, _: &[u8], _: usize) -> Result<crate::codec::OracleProbe, crate::errors::SalvageError> {
            Err(crate::errors::SalvageError::OracleUnavailable("unused in this test".into()))
        }
        fn sps_params(&self, _: &str) -> Result<crate::codec::SpsParams, crate::errors::SalvageError> {
            Err(crate::errors::SalvageError::OracleUnavailable("unused in this test".into()))
        }
        fn is_mp3(&self, _: &str) -> bool {
            false
        }
    }

    fn tkhd_bytes(track_id: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; 84];
        bytes[12..16].copy_from_slice(&track_id.to_be_bytes());
        bytes
    }

    fn mdhd_bytes(time_scale: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; 24];
        bytes[12..16].copy_from_slice(&time_scale.to_be_bytes());
        bytes
    }

    fn hdlr_bytes(sub_type: &[u8; 4]) -> Vec<u8> {
        let mut bytes = vec![0u8; 24];
        bytes[4..8].copy_from_slice(b"mhlr");
        bytes[8..12].copy_from_slice(sub_type);
        bytes
    }

    /// A single-entry `stsd` whose sample description falls through to
    /// `DataFormat::Binary` (neither `samr` nor `lpcm` is a recognized
    /// audio/video four-character code), so no codec-specific sub-struct
    /// needs to be laid out.
    fn stsd_bytes(format: &[u8; 4]) -> Vec<u8> {
        let mut bytes = vec![0u8; 8];
        bytes[4..8].copy_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&16u32.to_be_bytes()); // entry size, header only
        bytes.extend_from_slice(format);
        bytes.extend_from_slice(&[0u8; 6]); // reserved
        bytes.extend_from_slice(&1u16.to_be_bytes()); // data_reference_index
        bytes
    }

    /// One 16-byte AMR-NB frame: mode 2 (framing bit set), padded with
    /// `fill` so consecutive frames are distinguishable in a hex dump.
    fn amr_frame(fill: u8) -> Vec<u8> {
        let mut frame = vec![fill; 16];
        frame[0] = 0b0001_0100; // mode 2 << 3 | framing bit
        frame
    }

    #[test]
    fn repair_converts_co64_to_absolute_offsets_and_duration_to_movie_timescale() {
        use crate::config::RepairConfig;
        use crate::repairer::Repairer;
        use crate::track::model::{RawSample, TrackModel};

        const TRACK_ID: u32 = 7;
        const TRACK_TIMESCALE: u32 = 8000;
        const MOVIE_TIMESCALE: u32 = 600;

        let mut reference_model = TrackModel::new_for_test(TRACK_ID, TRACK_TIMESCALE, "samr");
        reference_model.push_sample(RawSample{offset: 0, size: 16, duration: 160, keyframe: true});
        reference_model.push_sample(RawSample{offset: 16, size: 16, duration: 160, keyframe: true});
        let (stsz, co64, stsc, stts) = reference_model.to_stbl_boxes(0);
        let stbl = BoxNode::parent(FourCC::from_str("stbl"), vec![stsz, co64, stsc, stts]);

        let tkhd = BoxNode::leaf(FourCC::from_str("tkhd"), tkhd_bytes(TRACK_ID));
        let mdhd = BoxNode::leaf(FourCC::from_str("mdhd"), mdhd_bytes(TRACK_TIMESCALE));
        let hdlr = BoxNode::leaf(FourCC::from_str("hdlr"), hdlr_bytes(b"soun"));
        let stsd = BoxNode::leaf(FourCC::from_str("stsd"), stsd_bytes(b"samr"));
        let trak = BoxNode::parent(FourCC::from_str("trak"), vec![tkhd, mdhd, hdlr, stsd, stbl]);

        let mut mvhd_bytes = vec![0u8; 20];
        mvhd_bytes[12..16].copy_from_slice(&MOVIE_TIMESCALE.to_be_bytes());
        let mvhd = BoxNode::leaf(FourCC::from_str("mvhd"), mvhd_bytes);
        let moov = BoxNode::parent(FourCC::from_str("moov"), vec![mvhd, trak]);

        let ftyp = BoxNode::leaf(FourCC::from_str("ftyp"), b"isom\0\0\x02\0isomiso2".to_vec());

        let reference_source = tempfile::NamedTempFile::new().unwrap();
        let ref_mdat = BoxNode::file_backed(FourCC::from_str("mdat"), LargeBox::new(reference_source.path(), 0, 0));

        let reference_tree = BoxTree{roots: vec![ftyp, moov, ref_mdat]};
        let reference_file = tempfile::NamedTempFile::new().unwrap();
        reference_tree.write_file(reference_file.path()).unwrap();
        let parsed_reference = BoxTree::parse_file(reference_file.path()).unwrap();

        // A leading "free" box pushes mdat's payload start well past byte
        // 0, so `locate_mdat` anchors the scanned `LargeBox` with
        // `file_begin > 0` -- exactly the case the window/absolute offset
        // split in `Repairer::scan` must get right. Payload holds two
        // 16-byte AMR-NB frames.
        let mut damaged = Vec::new();
        damaged.extend_from_slice(&16u32.to_be_bytes());
        damaged.extend_from_slice(b"free");
        damaged.extend_from_slice(&[0u8; 8]);

        let mdat_payload: Vec<u8> = amr_frame(0xAA).into_iter().chain(amr_frame(0xBB)).collect();
        damaged.extend_from_slice(&(8 + mdat_payload.len() as u32).to_be_bytes());
        damaged.extend_from_slice(b"mdat");
        damaged.extend_from_slice(&mdat_payload);

        let damaged_file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(damaged_file.path(), &damaged).unwrap();

        let oracle = NullOracle;
        let repairer = Repairer::new(parsed_reference, &oracle, RepairConfig::default());
        let output_file = tempfile::NamedTempFile::new().unwrap();
        repairer.repair(damaged_file.path(), output_file.path()).unwrap();

        let output = BoxTree::parse_file(output_file.path()).unwrap();

        let ftyp_len = output.find_first("ftyp").unwrap().length();
        let moov_len = output.find_first("moov").unwrap().length();
        let mdat_offset_base = ftyp_len + moov_len + 8;

        let mdat = output.find_first("mdat").unwrap();
        assert_eq!(mdat.length(), 8 + 32, "both AMR frames should survive the scan");

        let co64 = output.find_first("co64").unwrap();
        assert_eq!(co64.read_u64_be(8).unwrap(), mdat_offset_base, "first sample offset must be absolute");
        assert_eq!(co64.read_u64_be(16).unwrap(), mdat_offset_base + 16, "second sample offset must be absolute");

        // fix_times() for "samr" is a hardcoded 160 per sample regardless
        // of what the scan measured: 160 * 2 = 320 track-timescale units,
        // rescaled into the 600 movie timescale: ceil(320*600/8000) = 24.
        let expected_duration = 24u32;
        let tkhd = output.find_first("tkhd").unwrap();
        assert_eq!(tkhd.read_u32_be(20).unwrap(), expected_duration);

        let mvhd = output.find_first("mvhd").unwrap();
        assert_eq!(mvhd.read_u32_be(16).unwrap(), expected_duration);
    }
}
