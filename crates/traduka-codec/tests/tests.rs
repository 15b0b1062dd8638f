#![cfg(feature = "zstd")]

use traduka_codec::{Decompressor, LibZstd, detect};

fn compress(data: &[u8]) -> Vec<u8> {
    zstd::stream::encode_all(data, 3).expect("zstd encoding failed")
}

#[test]
fn decompresses_valid_frame() {
    let temp_dir = tempfile::Builder::new()
        .prefix("traduka-codec-")
        .tempdir()
        .expect("failed to create temp dir");
    let input = temp_dir.path().join("payload.bin.zst");
    let output = temp_dir.path().join("payload.bin");

    let content = b"translation model weights".repeat(1000);
    std::fs::write(&input, compress(&content)).unwrap();

    LibZstd.decompress(&input, &output).expect("decompression failed");
    assert_eq!(std::fs::read(&output).unwrap(), content);
}

#[test]
fn rejects_corrupt_frame() {
    let temp_dir = tempfile::Builder::new()
        .prefix("traduka-codec-")
        .tempdir()
        .expect("failed to create temp dir");
    let input = temp_dir.path().join("corrupt.zst");
    let output = temp_dir.path().join("corrupt");

    std::fs::write(&input, b"this is not a zstd frame").unwrap();

    let result = LibZstd.decompress(&input, &output);
    assert!(result.is_err(), "corrupt input must not decode: {result:?}");
}

#[test]
fn detect_picks_the_in_process_decoder() {
    let temp_dir = tempfile::Builder::new()
        .prefix("traduka-codec-")
        .tempdir()
        .expect("failed to create temp dir");
    let input = temp_dir.path().join("payload.zst");
    let output = temp_dir.path().join("payload");

    std::fs::write(&input, compress(b"detected")).unwrap();

    let decompressor = detect().expect("no decompressor available");
    decompressor.decompress(&input, &output).unwrap();
    assert_eq!(std::fs::read(&output).unwrap(), b"detected");
}
