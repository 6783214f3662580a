//! Test-only helpers for compiling throwaway `.proto` sources into descriptor
//! sets without depending on a real `buf`/`protoc` installation on the test
//! runner's PATH.

use prost::Message;
use prost_types::FileDescriptorSet;
use std::fs;
use std::path::Path;

/// Compiles inline proto strings into a `FileDescriptorSet` at test time.
///
/// `files` is a list of `(filename, contents)` pairs, written to a scratch
/// directory and compiled together so cross-file imports resolve.
pub fn compile_protos(files: &[(&str, &str)]) -> FileDescriptorSet {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let descriptor_path = temp_dir.path().join("descriptor.bin");
    let proto_dir = temp_dir.path().join("protos");
    fs::create_dir(&proto_dir).expect("failed to create protos dir");

    let paths: Vec<_> = files
        .iter()
        .map(|(name, content)| {
            let path = proto_dir.join(name);
            fs::write(&path, content).expect("failed to write proto file");
            path
        })
        .collect();

    compile_at(&paths, &proto_dir, &descriptor_path);

    let bytes = fs::read(&descriptor_path).expect("failed to read descriptor set");
    FileDescriptorSet::decode(bytes.as_slice()).expect("failed to decode file descriptor set")
}

/// Writes a `FileDescriptorSet` compiled from `files` to `out_path`, returning
/// the raw bytes. Useful for tests exercising the Loader's `path` variant,
/// which expects a directory on disk plus a pre-built descriptor file.
pub fn write_proto_dir(dir: &Path, files: &[(&str, &str)]) {
    fs::create_dir_all(dir).expect("failed to create proto dir");
    for (name, content) in files {
        fs::write(dir.join(name), content).expect("failed to write proto file");
    }
}

fn compile_at(paths: &[std::path::PathBuf], proto_dir: &Path, descriptor_path: &Path) {
    let mut config = prost_build::Config::new();
    config.file_descriptor_set_path(descriptor_path);
    config.out_dir(descriptor_path.parent().unwrap());
    config
        .compile_protos(paths, &[proto_dir])
        .expect("failed to compile protos");
}
