fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile user service proto
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/user.proto"], &["proto/"])?;

    // Compile audit service proto
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/audit.proto"], &["proto/"])?;

    Ok(())
}
