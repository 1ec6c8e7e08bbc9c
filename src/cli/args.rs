// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "k8sinv")]
#[command(author, version, about = "Ansible dynamic inventory from Kubernetes pods and services")]
pub struct Args {
    /// Inventory config file (*.kube.yaml / *.kube.yml)
    pub config: PathBuf,

    /// Print the full inventory document (the default mode)
    #[arg(long)]
    pub list: bool,

    /// Print the variables of a single host and nothing else
    #[arg(long, value_name = "HOST", conflicts_with = "list")]
    pub host: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}
