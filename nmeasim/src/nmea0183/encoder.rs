//! Builds framed NMEA 0183 sentences from a vessel snapshot.

use chrono::{DateTime, Datelike, Utc};

use super::checksum::{frame, MAX_SENTENCE_LEN};
use super::format::{angle, date, fixed, position, time, variation};
use super::kind::SentenceKind;
use crate::config::ConfigError;
use crate::environment::EnvironmentState;
use crate::error::EncodeError;
use crate::route::RouteTracker;
use crate::vessel::VesselState;

const FEET_PER_METER: f64 = 3.28084;
const FATHOMS_PER_METER: f64 = 0.546807;
const KMH_PER_KNOT: f64 = 1.852;
const MPS_PER_KNOT: f64 = 0.514444;

/// Everything a sentence may draw on for one vessel at one instant.
#[derive(Debug, Clone, Copy)]
pub struct SentenceContext<'a> {
    /// Simulated UTC time of the tick.
    pub time: DateTime<Utc>,
    pub state: &'a VesselState,
    pub environment: &'a EnvironmentState,
    /// Route progress, for route-following vessels.
    pub tracker: Option<&'a RouteTracker>,
}

/// Talker used when none is configured.
pub const DEFAULT_TALKER: &str = "GP";

/// Encoder for `$`-delimited sentences.
#[derive(Debug, Clone)]
pub struct SentenceEncoder {
    talker: String,
}

impl Default for SentenceEncoder {
    fn default() -> Self {
        Self {
            talker: DEFAULT_TALKER.to_string(),
        }
    }
}

impl SentenceEncoder {
    /// Encoder using [`DEFAULT_TALKER`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder that uses `talker` for every sentence.
    ///
    /// # Errors
    ///
    /// The talker must be exactly two ASCII letters.
    pub fn with_talker(talker: &str) -> Result<Self, ConfigError> {
        let talker = talker.trim().to_ascii_uppercase();
        if talker.len() != 2 || !talker.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ConfigError::invalid(
                "talker_id",
                talker,
                "must be two letters",
            ));
        }
        Ok(Self { talker })
    }

    /// Talker prefix, shared by every sentence kind.
    pub fn talker(&self) -> &str {
        &self.talker
    }

    /// Encode one sentence, framed with checksum and CRLF.
    pub fn encode(
        &self,
        kind: SentenceKind,
        ctx: &SentenceContext<'_>,
    ) -> Result<String, EncodeError> {
        let body = format!("{}{},{}", self.talker, kind.name(), fields(kind, ctx)?);
        let sentence = frame('$', &body);
        if sentence.len() > MAX_SENTENCE_LEN {
            return Err(EncodeError::SentenceTooLong {
                len: sentence.len(),
                max: MAX_SENTENCE_LEN,
            });
        }
        Ok(sentence)
    }

    /// Encode every kind in `kinds`, in order, keeping per-sentence failures.
    pub fn encode_all(
        &self,
        kinds: &[SentenceKind],
        ctx: &SentenceContext<'_>,
    ) -> Vec<(SentenceKind, Result<String, EncodeError>)> {
        kinds
            .iter()
            .map(|&kind| (kind, self.encode(kind, ctx)))
            .collect()
    }
}

/// Comma-separated fields after the address field.
fn fields(kind: SentenceKind, ctx: &SentenceContext<'_>) -> Result<String, EncodeError> {
    let state = ctx.state;
    let env = ctx.environment;

    let fields = match kind {
        SentenceKind::Rmc => format!(
            "{},A,{},{},{},{},{},A",
            time(&ctx.time),
            position(state.position)?,
            fixed("speed_over_ground", state.speed_knots, 1)?,
            angle("course_over_ground", state.course_over_ground)?,
            date(&ctx.time),
            variation(env.magnetic_variation)?,
        ),
        SentenceKind::Gga => format!(
            "{},{},{},{:02},{},{},M,{},M,,",
            time(&ctx.time),
            position(state.position)?,
            env.gnss.quality,
            env.gnss.satellites,
            fixed("hdop", env.gnss.hdop, 1)?,
            fixed("altitude", env.gnss.altitude_m, 1)?,
            fixed("geoidal_separation", env.gnss.geoidal_separation_m, 1)?,
        ),
        SentenceKind::Vtg => format!(
            "{},T,{},M,{},N,{},K,A",
            angle("course_over_ground", state.course_over_ground)?,
            angle(
                "course_over_ground",
                env.to_magnetic(state.course_over_ground)
            )?,
            fixed("speed_over_ground", state.speed_knots, 1)?,
            fixed("speed_over_ground", state.speed_knots * KMH_PER_KNOT, 1)?,
        ),
        SentenceKind::Zda => format!(
            "{},{:02},{:02},{:04},00,00",
            time(&ctx.time),
            ctx.time.day(),
            ctx.time.month(),
            ctx.time.year(),
        ),
        SentenceKind::Hdt => format!("{},T", angle("heading", state.heading)?),
        SentenceKind::Hdm => format!("{},M", angle("heading", env.to_magnetic(state.heading))?),
        SentenceKind::Hdg => format!(
            "{},0.0,E,{}",
            angle("heading", env.to_magnetic(state.heading))?,
            variation(env.magnetic_variation)?,
        ),
        SentenceKind::Vhw => format!(
            "{},T,{},M,{},N,{},K",
            angle("heading", state.heading)?,
            angle("heading", env.to_magnetic(state.heading))?,
            fixed("speed_through_water", state.speed_knots, 1)?,
            fixed(
                "speed_through_water",
                state.speed_knots * KMH_PER_KNOT,
                1
            )?,
        ),
        SentenceKind::Dbt => {
            let depth = env.water_depth_m;
            format!(
                "{},f,{},M,{},F",
                fixed("depth", depth * FEET_PER_METER, 1)?,
                fixed("depth", depth, 1)?,
                fixed("depth", depth * FATHOMS_PER_METER, 1)?,
            )
        }
        SentenceKind::MwvTrue => format!(
            "{},T,{},N,A",
            angle("wind_angle", env.true_wind_angle(state.heading))?,
            fixed("wind_speed", env.wind_speed_knots, 1)?,
        ),
        SentenceKind::MwvRelative => {
            let apparent = env.apparent_wind(state.heading, state.speed_knots);
            format!(
                "{},R,{},N,A",
                angle("wind_angle", apparent.angle)?,
                fixed("wind_speed", apparent.speed_knots, 1)?,
            )
        }
        SentenceKind::Mwd => format!(
            "{},T,{},M,{},N,{},M",
            angle("wind_direction", env.wind_direction)?,
            angle("wind_direction", env.to_magnetic(env.wind_direction))?,
            fixed("wind_speed", env.wind_speed_knots, 1)?,
            fixed("wind_speed", env.wind_speed_knots * MPS_PER_KNOT, 1)?,
        ),
        SentenceKind::Xte => match ctx.tracker.and_then(|t| t.cross_track()) {
            Some(xte) => format!(
                "A,A,{},{},N,A",
                fixed("cross_track", xte.distance_nm, 2)?,
                xte.steer.as_char()
            ),
            None => "V,V,,,N,N".to_string(),
        },
        SentenceKind::Rmb => rmb(ctx)?,
        SentenceKind::Rsa => format!("{},A,,V", fixed("rudder_angle", ctx.state.rudder_angle, 1)?),
    };
    Ok(fields)
}

fn rmb(ctx: &SentenceContext<'_>) -> Result<String, EncodeError> {
    let Some((tracker, leg, xte)) = ctx
        .tracker
        .and_then(|t| Some((t, t.current_leg()?, t.cross_track()?)))
    else {
        let mut empty = vec![""; 14];
        empty[0] = "V";
        empty[12] = "V";
        empty[13] = "N";
        return Ok(empty.join(","));
    };

    let state = ctx.state;
    let bearing = tracker.bearing_to_next();
    let vmg = state.speed_knots * (bearing - state.course_over_ground).to_radians().cos();

    Ok(format!(
        "A,{},{},{},{},{},{},{},{},{},A",
        fixed("cross_track", xte.distance_nm, 2)?,
        xte.steer.as_char(),
        waypoint_id(leg.from_index),
        waypoint_id(leg.to_index),
        position(leg.to)?,
        fixed("range", tracker.distance_to_next_nm(), 1)?,
        angle("bearing", bearing)?,
        fixed("vmg", vmg, 1)?,
        if tracker.arrived() { 'A' } else { 'V' },
    ))
}

/// Route waypoint name, 1-based.
fn waypoint_id(index: usize) -> String {
    format!("WP{:03}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::nmea0183::checksum::verify;
    use crate::route::{EndOfRoute, Route};
    use crate::vessel::NavigationStatus;
    use chrono::TimeZone;

    fn state(heading: f64, speed: f64) -> VesselState {
        let mut state = VesselState::at_rest(
            Coordinate::new(37.672623, -122.369095).unwrap(),
            heading,
            NavigationStatus::UnderwayUsingEngine,
        );
        state.speed_knots = speed;
        state
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap()
    }

    fn encode(kind: SentenceKind, state: &VesselState, tracker: Option<&RouteTracker>) -> String {
        let env = EnvironmentState::default();
        let ctx = SentenceContext {
            time: at(),
            state,
            environment: &env,
            tracker,
        };
        SentenceEncoder::new().encode(kind, &ctx).unwrap()
    }

    #[test]
    fn test_rmc() {
        let sentence = encode(SentenceKind::Rmc, &state(45.0, 8.0), None);
        assert!(sentence.starts_with(
            "$GPRMC,123045.00,A,3740.357,N,12222.146,W,8.0,45.0,010624,15.0,W,A*"
        ));
        assert!(sentence.ends_with("\r\n"));
        assert!(verify(&sentence));
    }

    #[test]
    fn test_gga() {
        let sentence = encode(SentenceKind::Gga, &state(0.0, 0.0), None);
        assert!(sentence.starts_with(
            "$GPGGA,123045.00,3740.357,N,12222.146,W,1,08,1.0,0.0,M,0.0,M,,*"
        ));
    }

    #[test]
    fn test_heading_family() {
        let s = state(100.0, 5.0);
        assert!(encode(SentenceKind::Hdt, &s, None).starts_with("$GPHDT,100.0,T*"));
        // 15° W variation
        assert!(encode(SentenceKind::Hdm, &s, None).starts_with("$GPHDM,115.0,M*"));
        assert!(encode(SentenceKind::Hdg, &s, None).starts_with("$GPHDG,115.0,0.0,E,15.0,W*"));
        assert!(encode(SentenceKind::Vhw, &s, None)
            .starts_with("$GPVHW,100.0,T,115.0,M,5.0,N,9.3,K*"));
    }

    #[test]
    fn test_depth() {
        let sentence = encode(SentenceKind::Dbt, &state(0.0, 0.0), None);
        assert!(sentence.starts_with("$GPDBT,32.8,f,10.0,M,5.5,F*"));
    }

    #[test]
    fn test_wind_sentences() {
        // Wind from 270 at 15 kn, vessel heading 0 at rest
        let s = state(0.0, 0.0);
        assert!(encode(SentenceKind::MwvTrue, &s, None).starts_with("$GPMWV,270.0,T,15.0,N,A*"));
        assert!(
            encode(SentenceKind::MwvRelative, &s, None).starts_with("$GPMWV,270.0,R,15.0,N,A*")
        );
        assert!(encode(SentenceKind::Mwd, &s, None)
            .starts_with("$GPMWD,270.0,T,285.0,M,15.0,N,7.7,M*"));
    }

    #[test]
    fn test_zda_and_vtg() {
        let s = state(90.0, 10.0);
        assert!(encode(SentenceKind::Zda, &s, None).starts_with("$GPZDA,123045.00,01,06,2024,00,00*"));
        assert!(encode(SentenceKind::Vtg, &s, None)
            .starts_with("$GPVTG,90.0,T,105.0,M,10.0,N,18.5,K,A*"));
    }

    #[test]
    fn test_route_sentences_without_route() {
        let s = state(0.0, 0.0);
        assert!(encode(SentenceKind::Xte, &s, None).starts_with("$GPXTE,V,V,,,N,N*"));
        assert!(encode(SentenceKind::Rmb, &s, None).starts_with("$GPRMB,V,,,,,,,,,,,,V,N*"));
    }

    #[test]
    fn test_route_sentences_on_track() {
        let route = Route::new(vec![
            Coordinate::new(0.0, 0.0).unwrap(),
            Coordinate::new(1.0, 0.0).unwrap(),
        ])
        .unwrap();
        let tracker = RouteTracker::new(route, EndOfRoute::Hold);
        let s = state(0.0, 6.0);

        let xte = encode(SentenceKind::Xte, &s, Some(&tracker));
        assert!(xte.starts_with("$GPXTE,A,A,0.00,"), "{}", xte);

        let rmb = encode(SentenceKind::Rmb, &s, Some(&tracker));
        assert!(
            rmb.starts_with("$GPRMB,A,0.00,"),
            "{}",
            rmb
        );
        assert!(rmb.contains(",WP001,WP002,0100.000,N,00000.000,E,60.0,0.0,6.0,V,A*"), "{}", rmb);
        assert!(verify(&rmb));
    }

    #[test]
    fn test_rudder() {
        assert!(encode(SentenceKind::Rsa, &state(0.0, 0.0), None).starts_with("$GPRSA,0.0,A,,V*"));

        let mut turning = state(0.0, 0.0);
        turning.rudder_angle = -12.5;
        assert!(encode(SentenceKind::Rsa, &turning, None).starts_with("$GPRSA,-12.5,A,,V*"));
    }

    #[test]
    fn test_default_talker_is_gp_for_every_kind() {
        let s = state(100.0, 5.0);
        assert!(encode(SentenceKind::Hdt, &s, None).starts_with("$GPHDT,"));
        for kind in SentenceKind::ALL {
            assert!(encode(kind, &s, None).starts_with("$GP"), "{:?}", kind);
        }
    }

    #[test]
    fn test_talker_override() {
        let encoder = SentenceEncoder::with_talker("ii").unwrap();
        assert_eq!(encoder.talker(), "II");
        let env = EnvironmentState::default();
        let s = state(0.0, 0.0);
        let ctx = SentenceContext {
            time: at(),
            state: &s,
            environment: &env,
            tracker: None,
        };
        let dbt = encoder.encode(SentenceKind::Dbt, &ctx).unwrap();
        assert!(dbt.starts_with("$IIDBT,"));
        assert!(SentenceEncoder::with_talker("G1").is_err());
        assert!(SentenceEncoder::with_talker("GPS").is_err());
    }

    #[test]
    fn test_non_finite_value_is_an_error() {
        let env = EnvironmentState::default();
        let mut s = state(0.0, 0.0);
        s.speed_knots = f64::NAN;
        let ctx = SentenceContext {
            time: at(),
            state: &s,
            environment: &env,
            tracker: None,
        };
        let result = SentenceEncoder::new().encode(SentenceKind::Rmc, &ctx);
        assert_eq!(
            result,
            Err(EncodeError::NotFinite {
                field: "speed_over_ground"
            })
        );
    }

    #[test]
    fn test_every_kind_fits_and_verifies() {
        let env = EnvironmentState::default();
        let s = state(123.4, 7.5);
        let ctx = SentenceContext {
            time: at(),
            state: &s,
            environment: &env,
            tracker: None,
        };
        for (kind, result) in SentenceEncoder::new().encode_all(&SentenceKind::ALL, &ctx) {
            let sentence = result.unwrap();
            assert!(sentence.len() <= MAX_SENTENCE_LEN, "{} too long", kind);
            assert!(verify(&sentence), "{} bad checksum", kind);
        }
    }
}
