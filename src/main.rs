/*!
 * memref - type inspection tool
 *
 * Prints one JSON line per type spec given on the command line, or the whole
 * primitive table when none is given.
 */

use std::error::Error;
use tracing::{error, info};

use memref::{init_tracing, Runtime, RuntimeConfig, TypeInfo};

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = RuntimeConfig::from_env();
    let runtime = Runtime::simulated_with(config)?;
    info!(
        pointer_size = runtime.provider().pointer_size(),
        endianness = %runtime.endianness(),
        "Runtime ready"
    );

    let specs: Vec<String> = std::env::args().skip(1).collect();
    let infos: Vec<TypeInfo> = if specs.is_empty() {
        runtime.types().iter().map(|ty| ty.info()).collect()
    } else {
        let mut infos = Vec::with_capacity(specs.len());
        for spec in &specs {
            match runtime.coerce_type(spec) {
                Ok(ty) => infos.push(ty.info()),
                Err(e) => {
                    error!(spec = %spec, error = %e, "Could not resolve type");
                    return Err(Box::new(e));
                }
            }
        }
        infos
    };

    for info in &infos {
        println!("{}", serde_json::to_string(info)?);
    }

    Ok(())
}
