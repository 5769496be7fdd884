use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use crate::config::FlowConfig;
use crate::controller::{ControllerProps, FrameScheduler, InteractionController};
use crate::error::{FlowError, FlowResult};
use crate::flow::{load_migration_csv, FlowRecord};
use crate::geo::{ContainerSize, GeometryProvider, Topology};
use crate::render::OverlaySurface;

/// Shown to the user instead of the map when either input fails to load.
pub const LOAD_FAILURE_MESSAGE: &str = "Something went wrong while loading the map data.";

#[derive(Debug, Clone)]
pub struct InputPaths {
    pub topology: PathBuf,
    pub migration: PathBuf,
}

/// Both datasets, decoded and ready for the interactive phase.
#[derive(Debug, Clone)]
pub struct FlowInputs {
    pub provider: GeometryProvider,
    pub records: Vec<FlowRecord>,
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct LoadFailure {
    pub message: &'static str,
    #[source]
    pub cause: FlowError,
}

pub fn load_geometry<P: AsRef<Path>>(path: P, object: &str) -> FlowResult<GeometryProvider> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| FlowError::io(path, e))?;
    let topology = Topology::from_json_str(&json)?;
    GeometryProvider::from_topology(&topology, object)
}

/// Loads boundaries and migration table side by side. Nothing partial is
/// returned.
///
/// Both reads run to completion before either result is inspected, so when
/// both fail the topology error is the one reported, whichever finished
/// first. No work past loading starts unless both succeed.
pub fn load_inputs(paths: &InputPaths, config: &FlowConfig) -> FlowResult<FlowInputs> {
    let (provider, records) = rayon::join(
        || load_geometry(&paths.topology, &config.topology_object),
        || load_migration_csv(&paths.migration),
    );
    let provider = provider?;
    let records = records?;
    info!(
        features = provider.features().len(),
        records = records.len(),
        "inputs loaded"
    );
    Ok(FlowInputs { provider, records })
}

/// Loads both inputs and enters the interactive phase, or reports a single
/// generic failure and stops.
pub fn start<S: OverlaySurface, F: FrameScheduler>(
    paths: &InputPaths,
    config: FlowConfig,
    container: ContainerSize,
    year: impl Into<String>,
    surface: S,
    scheduler: F,
) -> Result<InteractionController<S, F>, LoadFailure> {
    match load_inputs(paths, &config) {
        Ok(inputs) => Ok(InteractionController::new(ControllerProps {
            config,
            provider: inputs.provider,
            records: inputs.records,
            container,
            year: year.into(),
            surface,
            scheduler,
            seed: None,
        })),
        Err(cause) => {
            error!(error = %cause, "failed to load map inputs");
            Err(LoadFailure {
                message: LOAD_FAILURE_MESSAGE,
                cause,
            })
        }
    }
}
