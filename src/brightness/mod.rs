use tracing::{info, instrument, warn};

use crate::error::BacklightError;

pub use source::{BacklightSource, SysfsBacklight};
pub use value::{Operation, Outcome, Reading, Subsystem, clamp_to_range, step_down, step_up};

mod source;
mod value;

/// Runs one read, compute, write sequence against `source`
///
/// Both device files are read on every call, `get` and `max` never write.
///
/// # Errors
/// Returns an error if either device file can't be read or parsed
/// Returns an error if a device file reports a negative value
/// Returns an error if `set` has no value or its value isn't an integer
/// Returns an error if the new value can't be written
#[instrument(skip(source))]
pub fn execute<S: BacklightSource>(
    source: &S,
    operation: Operation,
    value: Option<&str>,
    step: u32,
) -> Result<Outcome, BacklightError> {
    let current = source.read_current()?;
    let max = source.read_max()?;

    // `set` clamps against max, which panics unless max is non-negative
    let max_value = max.non_negative()?;

    if current.value > max_value {
        warn!("Current brightness {} is above max {max_value}", current.value);
    }

    if value.is_some() && operation != Operation::Set {
        warn!("Ignoring value {value:?} for {operation:?}");
    }

    let new_value = match operation {
        Operation::Get => return Ok(Outcome::Print(current.raw)),
        Operation::Max => return Ok(Outcome::Print(max.raw)),
        Operation::Set => {
            let value = value.ok_or_else(|| BacklightError::Usage(String::from("missing value for set")))?;
            let requested = value.parse::<i64>().map_err(|source| BacklightError::ParseValue {
                value: value.to_string(),
                source,
            })?;

            clamp_to_range(requested, max_value)
        }
        // Stepping relies on a non-negative current value
        Operation::Up => step_up(current.non_negative()?, step, max_value),
        Operation::Down => step_down(current.non_negative()?, step),
    };

    source.write_current(new_value)?;
    info!("{operation:?}: {} -> {new_value}", current.value);

    Ok(Outcome::Written(new_value))
}
