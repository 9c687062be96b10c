// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Writes CRD YAML for the resources the checks read, so a test cluster
//! without the add-on operators can be seeded with them.
//!
//! Usage:
//!   cargo run --bin crdgen [output-dir]
//!
//! Files are written to `deploy/crds/` unless another directory is given.

use kube::CustomResourceExt;
use managed_api_verify::crd::{CustomDomain, Infrastructure, Postgres, RHMI};
use std::fs;
use std::path::Path;

const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = std::env::args().nth(1).unwrap_or_else(|| "deploy/crds".to_string());
    let output_dir = Path::new(&output_dir);

    fs::create_dir_all(output_dir)?;

    println!("Generating CRD YAML files from src/crd.rs...");

    generate_crd::<CustomDomain>("customdomains.crd.yaml", output_dir)?;
    generate_crd::<RHMI>("rhmis.crd.yaml", output_dir)?;
    generate_crd::<Postgres>("postgres.crd.yaml", output_dir)?;
    generate_crd::<Infrastructure>("infrastructures.crd.yaml", output_dir)?;

    println!("✓ Successfully generated CRD YAML files in {}", output_dir.display());
    println!("\nApply to a test cluster with: kubectl apply -f {}", output_dir.display());

    Ok(())
}

fn generate_crd<T>(filename: &str, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>>
where
    T: CustomResourceExt,
{
    let yaml = serde_yaml::to_string(&T::crd())?;
    let content = format!("{COPYRIGHT_HEADER}{yaml}");

    fs::write(output_dir.join(filename), content)?;
    println!("  ✓ Generated {filename}");

    Ok(())
}
