//! Search for the convective temperature when inversions are in the way.
use super::lift::CONTACT_TOLERANCE;
use crate::{interpolation::sample_one, intersection::first_crossing, met_formulas::dry_lapse};
use metfor::{HectoPascal, Kelvin, Meters, Quantity};

// A candidate CCL is only rejected if the environment there is warmer than the isohume by more
// than this, in Kelvin.
const WARM_ENVIRONMENT_MARGIN: f64 = 0.1;

/// Outcome of the search for the convective temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refinement {
    /// A dry adiabat from `tcon` reaches the CCL without being stopped by the environment.
    Converged {
        /// The convective temperature.
        tcon: Kelvin,
        /// Height of the convective condensation level.
        ccl_height: Meters,
        /// Temperature at the convective condensation level.
        ccl_temperature: Kelvin,
        /// Number of trial adiabats tried, including the last one.
        iterations: usize,
    },
    /// The iteration limit was reached, or a trial adiabat never met the isohume.
    NotConverged {
        /// The last convective temperature tried.
        tcon: Kelvin,
        /// Number of trial adiabats tried.
        iterations: usize,
    },
}

impl Refinement {
    /// Whether the search found a consistent convective temperature.
    #[inline]
    pub fn is_converged(&self) -> bool {
        match self {
            Refinement::Converged { .. } => true,
            Refinement::NotConverged { .. } => false,
        }
    }

    /// Number of trial adiabats used in the search.
    #[inline]
    pub fn iterations(&self) -> usize {
        match *self {
            Refinement::Converged { iterations, .. } => iterations,
            Refinement::NotConverged { iterations, .. } => iterations,
        }
    }
}

/// The curves the search works on, all with elevation as the vertical coordinate.
pub(super) struct SearchCurves<'a> {
    pub elevation: &'a [f64],
    pub pressure: &'a [f64],
    pub isohume: &'a [f64],
    pub env_height: &'a [f64],
    pub env_temperature: &'a [f64],
}

/// How far the search may go and how it gets there.
pub(super) struct SearchLimits {
    pub tcon_step: f64,
    pub max_iterations: usize,
    /// Crossings this close below the CCL, in meters, don't count as blocking it.
    pub elevation_tolerance: f64,
}

/// Warm the surface until a dry adiabat from it reaches the CCL.
///
/// The search starts from the temperature a dry adiabat needs at the surface to pass through the
/// first guess at the CCL, `(ccl_height, ccl_temperature)`. A trial adiabat that meets the
/// environment below the CCL is blocked by an inversion, so the surface is warmed by `tcon_step`
/// and another is tried. An adiabat that clears the CCL meets the isohume at a new CCL, and that
/// is accepted unless the environment there is still warmer than the isohume.
pub(super) fn refine_convective_temperature(
    curves: &SearchCurves,
    surface_pressure: HectoPascal,
    (ccl_height, ccl_temperature): (f64, f64),
    limits: &SearchLimits,
) -> Refinement {
    let ccl_pressure = sample_one(curves.elevation, curves.pressure, ccl_height)
        .unwrap_or(surface_pressure.unpack());
    let mut tcon = dry_lapse(
        surface_pressure,
        Kelvin(ccl_temperature),
        HectoPascal(ccl_pressure),
    )
    .unpack();
    let mut ccl_height = ccl_height;

    for iteration in 1..=limits.max_iterations {
        let trial: Vec<f64> = curves
            .pressure
            .iter()
            .map(|&p| dry_lapse(HectoPascal(p), Kelvin(tcon), surface_pressure).unpack())
            .collect();

        let blocked = first_crossing(
            curves.elevation,
            &trial,
            curves.env_height,
            curves.env_temperature,
            CONTACT_TOLERANCE,
        )
        .map(|(height, _)| height < ccl_height - limits.elevation_tolerance)
        .unwrap_or(false);

        if blocked {
            tcon += limits.tcon_step;
            continue;
        }

        let (cand_height, cand_temperature) = match first_crossing(
            curves.elevation,
            &trial,
            curves.elevation,
            curves.isohume,
            CONTACT_TOLERANCE,
        ) {
            Some(candidate) => candidate,
            None => {
                return Refinement::NotConverged {
                    tcon: Kelvin(tcon),
                    iterations: iteration,
                }
            }
        };

        let env_t = sample_one(curves.env_height, curves.env_temperature, cand_height)
            .unwrap_or(std::f64::NAN);

        if env_t > cand_temperature + WARM_ENVIRONMENT_MARGIN {
            ccl_height = cand_height;
            tcon += limits.tcon_step;
            continue;
        }

        return Refinement::Converged {
            tcon: Kelvin(tcon),
            ccl_height: Meters(cand_height),
            ccl_temperature: Kelvin(cand_temperature),
            iterations: iteration,
        };
    }

    Refinement::NotConverged {
        tcon: Kelvin(tcon),
        iterations: limits.max_iterations,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{met_formulas::pressure_from_altitude, utility::test_tools::*};

    struct Scenario {
        elevation: Vec<f64>,
        pressure: Vec<f64>,
        isohume: Vec<f64>,
        env_temperature: Vec<f64>,
    }

    impl Scenario {
        fn curves(&self) -> SearchCurves {
            SearchCurves {
                elevation: &self.elevation,
                pressure: &self.pressure,
                isohume: &self.isohume,
                env_height: &self.elevation,
                env_temperature: &self.env_temperature,
            }
        }

        fn naive_ccl(&self) -> (f64, f64) {
            first_crossing(
                &self.elevation,
                &self.isohume,
                &self.elevation,
                &self.env_temperature,
                CONTACT_TOLERANCE,
            )
            .unwrap()
        }
    }

    fn make_scenario(env_t: impl Fn(f64) -> f64) -> Scenario {
        let elevation: Vec<f64> = (0..=100).map(|i| i as f64 * 50.0).collect();

        Scenario {
            pressure: elevation
                .iter()
                .map(|&e| pressure_from_altitude(Meters(e)).unpack())
                .collect(),
            isohume: elevation.iter().map(|e| 290.0 - 0.0018 * e).collect(),
            env_temperature: elevation.iter().map(|&e| env_t(e)).collect(),
            elevation,
        }
    }

    fn limits(max_iterations: usize) -> SearchLimits {
        SearchLimits {
            tcon_step: 0.5,
            max_iterations,
            elevation_tolerance: 50.0,
        }
    }

    // Nearly isothermal below 500 m, a surface parcel has to be well heated to get through.
    fn inversion(e: f64) -> f64 {
        if e <= 500.0 {
            300.0 - 0.002 * e
        } else if e <= 1000.0 {
            299.0 - 0.016 * (e - 500.0)
        } else {
            291.0 - 0.0065 * (e - 1000.0)
        }
    }

    #[test]
    fn test_no_inversion() {
        let scenario = make_scenario(|e| 300.0 - 0.0065 * e);
        let (ccl_height, ccl_temperature) = scenario.naive_ccl();
        assert!(approx_equal(ccl_height, 10.0 / 0.0047, 1.0));

        let sfc_p = HectoPascal(scenario.pressure[0]);
        let result = refine_convective_temperature(
            &scenario.curves(),
            sfc_p,
            (ccl_height, ccl_temperature),
            &limits(200),
        );

        match result {
            Refinement::Converged {
                tcon,
                ccl_height: refined_height,
                iterations,
                ..
            } => {
                assert_eq!(iterations, 1);
                assert!(approx_equal(refined_height.unpack(), ccl_height, 5.0));
                assert!(tcon > Kelvin(300.0));
            }
            Refinement::NotConverged { .. } => panic!("should converge"),
        }
    }

    #[test]
    fn test_inversion_raises_tcon() {
        let scenario = make_scenario(inversion);
        let (ccl_height, ccl_temperature) = scenario.naive_ccl();
        assert!(approx_equal(ccl_height, 7.5 / 0.0047, 1.0));

        let sfc_p = HectoPascal(scenario.pressure[0]);
        let naive_tcon = dry_lapse(
            sfc_p,
            Kelvin(ccl_temperature),
            pressure_from_altitude(Meters(ccl_height)),
        );

        let result = refine_convective_temperature(
            &scenario.curves(),
            sfc_p,
            (ccl_height, ccl_temperature),
            &limits(200),
        );

        assert!(result.is_converged());
        assert!(result.iterations() > 1);
        match result {
            Refinement::Converged {
                tcon,
                ccl_height: refined_height,
                ..
            } => {
                assert!(tcon > naive_tcon);
                assert!(refined_height.unpack() > ccl_height);
            }
            Refinement::NotConverged { .. } => unreachable!(),
        }

        // Not enough tries to get over the inversion.
        let result = refine_convective_temperature(
            &scenario.curves(),
            sfc_p,
            (ccl_height, ccl_temperature),
            &limits(1),
        );
        assert_eq!(result.iterations(), 1);
        assert!(!result.is_converged());
    }
}
