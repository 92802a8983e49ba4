//! Command-line arguments for netautoctl

use clap::{Args, Parser, Subcommand};
use netauto_model::{LacpMode, DEFAULT_BGP_AS};
use std::path::PathBuf;

use crate::config_file::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "netautoctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// JSON inventory snapshot seeding the device session
    #[arg(short, long)]
    pub inventory: Option<PathBuf>,

    /// Log filter, overrides the configuration file
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Link aggregation groups
    #[command(subcommand)]
    Lag(LagCommand),

    /// EVPN/VXLAN services
    #[command(subcommand)]
    Evpn(EvpnCommand),

    /// Interface description and MTU
    #[command(subcommand)]
    Interface(InterfaceCommand),
}

#[derive(Subcommand, Debug)]
pub enum LagCommand {
    /// Bundle ports into a new LAG
    Create {
        name: String,

        /// Member ports, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        members: Vec<String>,

        /// LACP mode (active, passive, static)
        #[arg(long, default_value = "active")]
        lacp: LacpMode,

        #[command(flatten)]
        push: PushArgs,
    },

    /// Remove a LAG and release its members
    Delete {
        name: String,

        /// Member ports, comma separated
        #[arg(short, long, value_delimiter = ',')]
        members: Vec<String>,

        #[command(flatten)]
        push: PushArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum EvpnCommand {
    /// Render a service, refusing VNIs already in use
    Deploy {
        #[command(flatten)]
        service: ServiceArgs,

        /// Route distinguisher, derived from ASN and VNI when omitted
        #[arg(long, requires = "vrf")]
        rd: Option<String>,

        /// Import route targets, comma separated
        #[arg(long, value_delimiter = ',', requires = "rd")]
        rt_import: Vec<String>,

        /// Export route targets, comma separated
        #[arg(long, value_delimiter = ',', requires = "rd")]
        rt_export: Vec<String>,

        #[command(flatten)]
        push: PushArgs,
    },

    /// Render removal of a service
    Delete {
        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        push: PushArgs,
    },
}

#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// Service name
    #[arg(short, long)]
    pub name: String,

    /// Service VLAN
    #[arg(long)]
    pub vlan: u16,

    /// VXLAN network identifier
    #[arg(long)]
    pub vni: u32,

    /// VRF name, defaults to the service name
    #[arg(long)]
    pub vrf: Option<String>,

    /// BGP autonomous system
    #[arg(long, default_value_t = DEFAULT_BGP_AS)]
    pub asn: u32,

    /// Attachment interface on the session host
    #[arg(long)]
    pub interface: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum InterfaceCommand {
    /// Change description and MTU
    Set {
        name: String,

        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(long)]
        mtu: Option<u32>,

        #[command(flatten)]
        push: PushArgs,
    },
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PushArgs {
    /// Push the rendered payload to the device
    #[arg(long)]
    pub apply: bool,

    /// Stage and diff without committing
    #[arg(long, requires = "apply")]
    pub dry_run: bool,
}
