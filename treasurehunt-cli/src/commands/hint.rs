//! One-shot directional hint.

use treasurehunt::coord::{hint, Position};

use crate::error::CliError;

/// Arguments for the hint command.
pub struct HintArgs {
    pub target_lat: f64,
    pub target_lon: f64,
    pub current_lat: f64,
    pub current_lon: f64,
}

/// Print the hint pointing from the current position to the target.
pub fn run(args: HintArgs) -> Result<(), CliError> {
    println!("{}", describe(&args)?);
    Ok(())
}

fn describe(args: &HintArgs) -> Result<String, CliError> {
    for (name, value, limit) in [
        ("target latitude", args.target_lat, 90.0),
        ("target longitude", args.target_lon, 180.0),
        ("current latitude", args.current_lat, 90.0),
        ("current longitude", args.current_lon, 180.0),
    ] {
        if !value.is_finite() || value.abs() > limit {
            return Err(CliError::Usage(format!(
                "{} must be between -{} and {} degrees, got {}",
                name, limit, limit, value
            )));
        }
    }

    let target = Position::new(args.target_lat, args.target_lon);
    let current = Position::new(args.current_lat, args.current_lon);
    Ok(hint(target, current).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(target: (f64, f64), current: (f64, f64)) -> HintArgs {
        HintArgs {
            target_lat: target.0,
            target_lon: target.1,
            current_lat: current.0,
            current_lon: current.1,
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&args((10.0, 20.0), (5.0, 15.0))).unwrap(), "north, east");
        assert_eq!(describe(&args((5.0, 15.0), (10.0, 20.0))).unwrap(), "south, west");
    }

    #[test]
    fn test_out_of_range() {
        assert!(describe(&args((91.0, 0.0), (0.0, 0.0))).is_err());
        assert!(describe(&args((0.0, 0.0), (0.0, f64::NAN))).is_err());
    }
}
