use std::{io::Result, path::PathBuf};
use walkdir::WalkDir;

fn main() -> Result<()> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    // protos live beside the member crates at the workspace root
    let workspace_root = manifest_dir.parent().expect("Failed to find workspace root");
    let proto_dir = workspace_root.join("protos");

    println!(
        "cargo:rerun-if-changed={}",
        proto_dir
            .as_path()
            .to_str()
            .expect("Cannot get proto dir str path")
    );

    let protofiles: Vec<PathBuf> = WalkDir::new(proto_dir.clone())
        .into_iter()
        .filter_map(|a| a.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "proto"))
        .map(|a| a.path().to_path_buf())
        .collect();

    let protoc = protoc_bin_vendored::protoc_bin_path().expect("Failed to locate vendored protoc");
    std::env::set_var("PROTOC", protoc);

    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&protofiles, &[proto_dir])
        .inspect_err(|err| println!("{}", err))
        .expect("failed");

    Ok(())
}
