//! linelab CLI - command-line driver for the linelab library.
//!
//! Each subcommand builds one `WorkRequest`, dispatches it through the
//! background job layer, and prints the delivered result.

mod error;
mod runner;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use error::CliError;
use linelab::data::Condition;
use linelab::dispatch::{
    BandsRequest, DownloadXscRequest, SelectRequest, WorkPayload, WorkRequest,
};
use linelab::fetch::FetchRequest;
use linelab::spectra::{
    CoefficientRequest, Component, Diluent, Environment, InstrumentalSettings, PlotLabels,
    SpectrumRequest, WavenumberRange,
};
use runner::CliRunner;

#[derive(Debug, Clone, ValueEnum)]
enum SpectrumKind {
    /// Absorption spectrum, 1 - exp(-k*l)
    Absorption,
    /// Radiance spectrum, Planck-weighted emission
    Radiance,
    /// Transmittance spectrum, exp(-k*l)
    Transmittance,
}

#[derive(Parser)]
#[command(name = "linelab")]
#[command(version = linelab::VERSION)]
#[command(about = "Fetch spectroscopic line data and compute spectra", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, ClapArgs)]
struct SpectrumArgs {
    /// Source table (or cached .xsc cross-section) name
    #[arg(long)]
    table: String,

    /// Line-shape function: Voigt, Lorentz, Gauss, "SD Voigt", Galatry, HT
    #[arg(long, default_value = "Voigt")]
    profile: String,

    /// Lower wavenumber bound (cm^-1)
    #[arg(long)]
    numin: f64,

    /// Upper wavenumber bound (cm^-1)
    #[arg(long)]
    numax: f64,

    /// Wavenumber grid step (cm^-1)
    #[arg(long, default_value = "0.01")]
    step: f64,

    /// Line wing cutoff (cm^-1)
    #[arg(long, default_value = "10.0")]
    wing: f64,

    /// Line wing cutoff in half-widths
    #[arg(long, default_value = "50.0")]
    wing_hw: f64,

    /// Temperature (K)
    #[arg(long, default_value = "296.0")]
    temperature: f64,

    /// Pressure (atm)
    #[arg(long, default_value = "1.0")]
    pressure: f64,

    /// Air diluent fraction
    #[arg(long, default_value = "1.0")]
    air: f64,

    /// Self-broadening diluent fraction
    #[arg(long, default_value = "0.0")]
    self_fraction: f64,

    /// Restrict to one molecule id (with --iso-id)
    #[arg(long)]
    molecule_id: Option<u32>,

    /// Restrict to one local isotopologue id (with --molecule-id)
    #[arg(long)]
    iso_id: Option<u32>,
}

impl SpectrumArgs {
    fn coefficient_request(&self, title: &str) -> CoefficientRequest {
        let components = match (self.molecule_id, self.iso_id) {
            (Some(molecule_id), Some(isotopologue_id)) => vec![Component {
                molecule_id,
                isotopologue_id,
            }],
            _ => vec![],
        };
        CoefficientRequest {
            profile: self.profile.clone(),
            components,
            source_tables: vec![self.table.clone()],
            environment: Environment {
                temperature: self.temperature,
                pressure: self.pressure,
            },
            diluent: Diluent {
                air: self.air,
                self_broadening: self.self_fraction,
            },
            range: WavenumberRange {
                min: self.numin,
                max: self.numax,
            },
            step: self.step,
            wing: self.wing,
            wing_hw: self.wing_hw,
            labels: PlotLabels {
                title: title.to_string(),
                titlex: "Wavenumber (cm^-1)".to_string(),
                titley: title.to_string(),
                name: self.table.clone(),
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch line data from the remote service into a named table
    Fetch {
        /// Name for the fetched table
        #[arg(long)]
        name: String,
        /// Global isotopologue ids, comma separated
        #[arg(long, value_delimiter = ',')]
        iso_ids: Vec<u32>,
        /// Lower wavenumber bound (cm^-1)
        #[arg(long)]
        numin: f64,
        /// Upper wavenumber bound (cm^-1)
        #[arg(long)]
        numax: f64,
        /// Parameter groups to request, comma separated
        #[arg(long, value_delimiter = ',')]
        parameter_groups: Vec<String>,
        /// Individual parameters to request, comma separated
        #[arg(long, value_delimiter = ',')]
        parameters: Vec<String>,
    },

    /// List all cached table and cross-section names
    Tables,

    /// Summarize a cached table or cross-section
    Meta {
        /// Table or cross-section name
        table: String,
    },

    /// Group a table's lines into bands
    Bands {
        /// Table name
        table: String,
    },

    /// Derive a filtered table from a cached one
    Select {
        /// Source table name
        #[arg(long)]
        table: String,
        /// Destination table name
        #[arg(long)]
        into: String,
        /// Keep rows with nu at or above this bound
        #[arg(long)]
        numin: Option<f64>,
        /// Keep rows with nu at or below this bound
        #[arg(long)]
        numax: Option<f64>,
        /// Columns to keep, comma separated (all when omitted)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
    },

    /// Compute an absorption coefficient profile
    Coefficient {
        #[command(flatten)]
        spectrum: SpectrumArgs,
    },

    /// Compute a derived spectrum
    Spectrum {
        #[arg(long, value_enum)]
        kind: SpectrumKind,

        #[command(flatten)]
        spectrum: SpectrumArgs,

        /// Optical path length (cm)
        #[arg(long, default_value = "100.0")]
        path_length: f64,

        /// Instrumental function: rectangular, triangular, gaussian,
        /// diffraction, michelson, dispersion (none when omitted)
        #[arg(long, default_value = "")]
        instrumental_fn: String,

        /// Instrumental resolution (cm^-1)
        #[arg(long, default_value = "0.01")]
        resolution: f64,

        /// Instrumental function wing (cm^-1)
        #[arg(long, default_value = "100.0")]
        af_wing: f64,
    },

    /// Download cross-section files and cache them
    DownloadXsc {
        /// Cross-section names as known to the remote service
        #[arg(long, value_delimiter = ',')]
        names: Vec<String>,
        /// Molecule name used to derive local file names
        #[arg(long)]
        molecule: String,
    },
}

impl Command {
    fn into_request(self) -> WorkRequest {
        match self {
            Command::Fetch {
                name,
                iso_ids,
                numin,
                numax,
                parameter_groups,
                parameters,
            } => WorkRequest::Fetch(FetchRequest {
                data_name: name,
                iso_id_list: iso_ids,
                numin,
                numax,
                parameter_groups,
                parameters,
            }),

            Command::Tables => WorkRequest::TableNames,

            Command::Meta { table } => WorkRequest::TableMetaData { table_name: table },

            Command::Bands { table } => WorkRequest::Bands(BandsRequest { table_name: table }),

            Command::Select {
                table,
                into,
                numin,
                numax,
                columns,
            } => {
                let condition = match (numin, numax) {
                    (Some(min), Some(max)) => Some(Condition::Between {
                        param: "nu".to_string(),
                        min,
                        max,
                    }),
                    (Some(min), None) => Some(Condition::Not(Box::new(Condition::Lt {
                        param: "nu".to_string(),
                        value: min,
                    }))),
                    (None, Some(max)) => Some(Condition::Not(Box::new(Condition::Gt {
                        param: "nu".to_string(),
                        value: max,
                    }))),
                    (None, None) => None,
                };
                WorkRequest::Select(SelectRequest {
                    table_name: table,
                    destination_table_name: into,
                    parameter_names: columns,
                    condition,
                })
            }

            Command::Coefficient { spectrum } => WorkRequest::AbsorptionCoefficient(
                spectrum.coefficient_request("Absorption Coefficient"),
            ),

            Command::Spectrum {
                kind,
                spectrum,
                path_length,
                instrumental_fn,
                resolution,
                af_wing,
            } => {
                let (title, build): (_, fn(SpectrumRequest) -> WorkRequest) = match kind {
                    SpectrumKind::Absorption => {
                        ("Absorption Spectrum", WorkRequest::AbsorptionSpectrum)
                    }
                    SpectrumKind::Radiance => ("Radiance Spectrum", WorkRequest::RadianceSpectrum),
                    SpectrumKind::Transmittance => (
                        "Transmittance Spectrum",
                        WorkRequest::TransmittanceSpectrum,
                    ),
                };
                build(SpectrumRequest {
                    coefficient: spectrum.coefficient_request(title),
                    path_length,
                    instrumental: InstrumentalSettings {
                        function: instrumental_fn,
                        resolution,
                        af_wing,
                    },
                })
            }

            Command::DownloadXsc { names, molecule } => {
                WorkRequest::DownloadCrossSections(DownloadXscRequest {
                    cross_sections: names,
                    molecule_name: molecule,
                })
            }
        }
    }
}

fn print_payload(payload: &WorkPayload) {
    match payload {
        WorkPayload::TableNames(names) | WorkPayload::Started(names) => {
            for name in names {
                println!("{}", name);
            }
        }
        WorkPayload::Select {
            new_table_name,
            all_tables,
        } => {
            println!("created {}", new_table_name);
            for name in all_tables {
                println!("{}", name);
            }
        }
        WorkPayload::Bands(bands) => {
            println!("{} bands in {}", bands.bands.len(), bands.table_name);
            for band in &bands.bands {
                println!("{}\t{} lines", band.band_id, band.nu.len());
            }
        }
        WorkPayload::Spectrum(envelope) => {
            println!("# {} ({} points)", envelope.title, envelope.x.len());
            for (x, y) in envelope.x.iter().zip(&envelope.y) {
                println!("{:.6e} {:.6e}", x, y);
            }
        }
        WorkPayload::TableMetaData(meta) => {
            println!(
                "length: {}\nnumin: {}\nnumax: {}\nxsc: {}",
                meta.length, meta.numin, meta.numax, meta.xsc
            );
            if !meta.parameters.is_empty() {
                println!("parameters: {}", meta.parameters.join(", "));
            }
        }
        WorkPayload::CrossSectionsAdded(names) => {
            for name in names {
                println!("cached {}", name);
            }
        }
    }
}

fn main() {
    let args = Args::parse();

    let runner = match CliRunner::new() {
        Ok(runner) => runner,
        Err(e) => e.exit(),
    };

    match runner.run(args.command.into_request()) {
        Ok(payload) => print_payload(&payload),
        Err(e) => e.exit(),
    }
}
