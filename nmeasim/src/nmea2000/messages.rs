//! PGN payloads built from a vessel snapshot.

use chrono::{DateTime, Timelike, Utc};

use super::fields::{
    angle_i16, angle_u16, scaled_i16, scaled_i32, scaled_i64, scaled_u16, scaled_u32, speed_u16,
    FieldWriter, POSITION_RESOLUTION, POSITION_RESOLUTION_64, ROT_RESOLUTION, SPEED_RESOLUTION,
};
use super::pgn::Pgn;
use crate::coord::{Coordinate, Steer};
use crate::error::{finite, EncodeError};
use crate::nmea0183::SentenceContext;
use crate::vessel::{VesselIdentity, MAX_DRAFT_M};

/// Broadcast destination address.
pub const BROADCAST: u8 = 255;

const NOT_AVAILABLE_U16: u16 = 0xFFFF;
const NOT_AVAILABLE_I16: i16 = 0x7FFF;
const NOT_AVAILABLE_U32: u32 = 0xFFFF_FFFF;

/// Wind reference codes for PGN 130306.
const WIND_APPARENT: u8 = 2;
const WIND_TRUE_BOAT: u8 = 3;

/// One PGN instance before framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct N2kMessage {
    pub pgn: Pgn,
    pub priority: u8,
    pub source: u8,
    pub destination: u8,
    pub data: Vec<u8>,
}

/// Build the payloads for `pgn`.
///
/// Most PGNs produce one message. Wind data produces two, apparent then
/// true. PGNs that need a route produce nothing for a vessel without one.
pub fn build(
    pgn: Pgn,
    sid: u8,
    ctx: &SentenceContext<'_>,
    identity: &VesselIdentity,
) -> Result<Vec<Vec<u8>>, EncodeError> {
    let payloads = match pgn {
        Pgn::SystemTime => vec![system_time(sid, &ctx.time)],
        Pgn::Rudder => vec![rudder(ctx)?],
        Pgn::VesselHeading => vec![vessel_heading(sid, ctx)?],
        Pgn::Speed => vec![speed(sid, ctx)?],
        Pgn::WaterDepth => vec![water_depth(sid, ctx)?],
        Pgn::PositionRapid => vec![position_rapid(ctx.state.position)?],
        Pgn::CogSogRapid => vec![cog_sog(sid, ctx)?],
        Pgn::GnssPosition => vec![gnss_position(sid, ctx)?],
        Pgn::CrossTrackError => vec![cross_track_error(sid, ctx)?],
        Pgn::NavigationData => navigation_data(sid, ctx)?.into_iter().collect(),
        Pgn::WindData => wind_data(sid, ctx)?,
        Pgn::AisClassAPosition => vec![ais_position(ctx, identity)?],
        Pgn::AisClassAStatic => vec![ais_static(identity)?],
    };
    debug_assert!(payloads.iter().all(|p| p.len() == pgn.length()));
    Ok(payloads)
}

/// Days since 1970-01-01 and time of day in 0.0001 s.
fn date_time(at: &DateTime<Utc>) -> (u16, u32) {
    let days = at.timestamp().div_euclid(86_400).clamp(0, 0xFFFD) as u16;
    let tenth_ms = at.num_seconds_from_midnight() * 10_000 + at.timestamp_subsec_micros().min(999_999) / 100;
    (days, tenth_ms)
}

fn system_time(sid: u8, at: &DateTime<Utc>) -> Vec<u8> {
    let (days, time) = date_time(at);
    let mut w = FieldWriter::with_capacity(8);
    // Source GPS (0), upper nibble reserved
    w.u8(sid).u8(0xF0).u16(days).u32(time);
    w.finish()
}

fn rudder(ctx: &SentenceContext<'_>) -> Result<Vec<u8>, EncodeError> {
    let mut w = FieldWriter::with_capacity(8);
    w.u8(0) // instance
        .u8(0xF8) // no direction order, reserved
        .i16(NOT_AVAILABLE_I16) // angle order
        .i16(angle_i16("rudder_angle", ctx.state.rudder_angle)?)
        .reserved(2);
    Ok(w.finish())
}

fn vessel_heading(sid: u8, ctx: &SentenceContext<'_>) -> Result<Vec<u8>, EncodeError> {
    let mut w = FieldWriter::with_capacity(8);
    w.u8(sid)
        .u16(angle_u16("heading", ctx.state.heading)?)
        .i16(NOT_AVAILABLE_I16) // deviation
        .i16(angle_i16("magnetic_variation", ctx.environment.magnetic_variation)?)
        .u8(0xFC); // true reference, reserved
    Ok(w.finish())
}

fn speed(sid: u8, ctx: &SentenceContext<'_>) -> Result<Vec<u8>, EncodeError> {
    let mut w = FieldWriter::with_capacity(8);
    let stw = speed_u16("speed_through_water", ctx.state.speed_knots)?;
    let sog = speed_u16("speed_over_ground", ctx.state.speed_knots)?;
    w.u8(sid)
        .u16(stw)
        .u16(sog)
        .u8(0) // paddle wheel
        .u8(0xF0) // forward, reserved
        .reserved(1);
    Ok(w.finish())
}

fn water_depth(sid: u8, ctx: &SentenceContext<'_>) -> Result<Vec<u8>, EncodeError> {
    let env = ctx.environment;
    let mut w = FieldWriter::with_capacity(8);
    w.u8(sid)
        .u32(scaled_u32("depth", env.water_depth_m, 0.01)?)
        .i16(scaled_i16("depth_offset", env.depth_offset_m, 0.001)?)
        .u8(0xFF); // range not available
    Ok(w.finish())
}

fn position_rapid(position: Coordinate) -> Result<Vec<u8>, EncodeError> {
    let mut w = FieldWriter::with_capacity(8);
    w.i32(scaled_i32("latitude", position.lat(), POSITION_RESOLUTION)?)
        .i32(scaled_i32("longitude", position.lon(), POSITION_RESOLUTION)?);
    Ok(w.finish())
}

fn cog_sog(sid: u8, ctx: &SentenceContext<'_>) -> Result<Vec<u8>, EncodeError> {
    let mut w = FieldWriter::with_capacity(8);
    w.u8(sid)
        .u8(0xFC) // true reference, reserved
        .u16(angle_u16("course_over_ground", ctx.state.course_over_ground)?)
        .u16(speed_u16("speed_over_ground", ctx.state.speed_knots)?)
        .reserved(2);
    Ok(w.finish())
}

fn gnss_position(sid: u8, ctx: &SentenceContext<'_>) -> Result<Vec<u8>, EncodeError> {
    let gnss = &ctx.environment.gnss;
    let position = ctx.state.position;
    let (days, time) = date_time(&ctx.time);

    let mut w = FieldWriter::with_capacity(Pgn::GnssPosition.length());
    w.u8(sid)
        .u16(days)
        .u32(time)
        .i64(scaled_i64("latitude", position.lat(), POSITION_RESOLUTION_64)?)
        .i64(scaled_i64("longitude", position.lon(), POSITION_RESOLUTION_64)?)
        .i64(scaled_i64("altitude", gnss.altitude_m, 1e-6)?)
        .u8(0x10) // GPS, GNSS fix
        .u8(0xFC) // no integrity checking, reserved
        .u8(gnss.satellites)
        .i16(scaled_i16("hdop", gnss.hdop, 0.01)?)
        .i16(scaled_i16("pdop", gnss.pdop, 0.01)?)
        .i32(scaled_i32(
            "geoidal_separation",
            gnss.geoidal_separation_m,
            0.01,
        )?)
        .u8(0); // reference stations
    Ok(w.finish())
}

/// Signed cross-track distance in meters, positive when right of track.
fn signed_xte_m(ctx: &SentenceContext<'_>) -> Option<f64> {
    let xte = ctx.tracker?.cross_track()?;
    let meters = xte.distance_nm * crate::coord::METERS_PER_NM;
    Some(match xte.steer {
        Steer::Left => meters,
        Steer::Right => -meters,
    })
}

fn cross_track_error(sid: u8, ctx: &SentenceContext<'_>) -> Result<Vec<u8>, EncodeError> {
    let mut w = FieldWriter::with_capacity(8);
    w.u8(sid);
    match signed_xte_m(ctx) {
        // Autonomous mode, reserved, navigation not terminated
        Some(xte) => w.u8(0x30).i32(scaled_i32("cross_track", xte, 0.01)?),
        // Navigation terminated
        None => w.u8(0x70).i32(0x7FFF_FFFF),
    };
    w.pad_to(8);
    Ok(w.finish())
}

fn navigation_data(sid: u8, ctx: &SentenceContext<'_>) -> Result<Option<Vec<u8>>, EncodeError> {
    let Some((tracker, leg)) = ctx
        .tracker
        .and_then(|t| Some((t, t.current_leg()?)))
    else {
        return Ok(None);
    };

    let arrived = tracker.arrived();
    let bearing_leg = crate::coord::initial_bearing(leg.from, leg.to);
    let bearing_next = tracker.bearing_to_next();
    let closing = ctx.state.speed_knots
        * crate::vessel::KNOTS_TO_MPS
        * (bearing_next - ctx.state.course_over_ground).to_radians().cos();

    // bits 0-1 true reference, 2-3 perpendicular not crossed,
    // 4-5 arrival circle, 6-7 great circle
    let flags = if arrived { 0x10 } else { 0x00 };

    let mut w = FieldWriter::with_capacity(Pgn::NavigationData.length());
    w.u8(sid)
        .u32(scaled_u32(
            "distance_to_waypoint",
            tracker.distance_to_next_nm() * crate::coord::METERS_PER_NM,
            0.01,
        )?)
        .u8(flags)
        .u32(NOT_AVAILABLE_U32) // ETA time
        .u16(NOT_AVAILABLE_U16) // ETA date
        .u16(angle_u16("bearing", bearing_leg)?)
        .u16(angle_u16("bearing", bearing_next)?)
        .u32(leg.from_index as u32 + 1)
        .u32(leg.to_index as u32 + 1)
        .i32(scaled_i32("latitude", leg.to.lat(), POSITION_RESOLUTION)?)
        .i32(scaled_i32("longitude", leg.to.lon(), POSITION_RESOLUTION)?)
        .i16(scaled_i16("waypoint_closing_velocity", closing, SPEED_RESOLUTION)?);
    Ok(Some(w.finish()))
}

fn wind_data(sid: u8, ctx: &SentenceContext<'_>) -> Result<Vec<Vec<u8>>, EncodeError> {
    let env = ctx.environment;
    let apparent = env.apparent_wind(ctx.state.heading, ctx.state.speed_knots);

    let frame = |speed_knots: f64, angle: f64, reference: u8| -> Result<Vec<u8>, EncodeError> {
        let mut w = FieldWriter::with_capacity(8);
        w.u8(sid)
            .u16(speed_u16("wind_speed", speed_knots)?)
            .u16(angle_u16("wind_angle", angle)?)
            .u8(0xF8 | reference)
            .reserved(2);
        Ok(w.finish())
    };

    Ok(vec![
        frame(apparent.speed_knots, apparent.angle, WIND_APPARENT)?,
        frame(
            env.wind_speed_knots,
            env.true_wind_angle(ctx.state.heading),
            WIND_TRUE_BOAT,
        )?,
    ])
}

fn ais_position(ctx: &SentenceContext<'_>, identity: &VesselIdentity) -> Result<Vec<u8>, EncodeError> {
    let state = ctx.state;
    let rot = match state.rate_of_turn {
        // degrees per minute to radians per second
        Some(rot) => scaled_i16(
            "rate_of_turn",
            (finite("rate_of_turn", rot)? / 60.0).to_radians(),
            ROT_RESOLUTION,
        )
        .unwrap_or(if rot > 0.0 { 0x7FFD } else { i16::MIN }),
        None => NOT_AVAILABLE_I16,
    };
    let second = ctx.time.second().min(59) as u8;

    let mut w = FieldWriter::with_capacity(Pgn::AisClassAPosition.length());
    w.u8(1) // message id 1, repeat 0
        .u32(identity.mmsi.value())
        .i32(scaled_i32("longitude", state.position.lon(), POSITION_RESOLUTION)?)
        .i32(scaled_i32("latitude", state.position.lat(), POSITION_RESOLUTION)?)
        .u8(second << 2) // low accuracy, no RAIM
        .u16(angle_u16("course_over_ground", state.course_over_ground)?)
        .u16(speed_u16("speed_over_ground", state.speed_knots)?)
        .u8(0)
        .u8(0)
        .u8(0) // communication state, channel A VDL reception
        .u16(angle_u16("heading", state.heading)?)
        .i16(rot)
        .u8(0xC0 | state.navigation_status.code()) // no special maneuver
        .reserved(2);
    Ok(w.finish())
}

fn ais_static(identity: &VesselIdentity) -> Result<Vec<u8>, EncodeError> {
    let dims = &identity.dimensions;
    let decimeters = |field: &'static str, meters: f64| scaled_u16(field, meters, 0.1);

    let mut w = FieldWriter::with_capacity(Pgn::AisClassAStatic.length());
    w.u8(5) // message id 5, repeat 0
        .u32(identity.mmsi.value())
        .u32(identity.imo.unwrap_or(0));
    w.text("call_sign", &identity.call_sign, 7)?;
    w.text("name", &identity.name, 20)?;
    w.u8(identity.ship_type.code())
        .u16(decimeters("length", dims.length())?)
        .u16(decimeters("beam", dims.beam())?)
        .u16(decimeters("to_starboard", dims.to_starboard)?)
        .u16(decimeters("to_bow", dims.to_bow)?)
        .u16(NOT_AVAILABLE_U16) // ETA date
        .u32(NOT_AVAILABLE_U32) // ETA time
        .u16(scaled_u16(
            "draught",
            identity.draft_m.unwrap_or(0.0).min(MAX_DRAFT_M),
            0.01,
        )?);
    w.text("destination", &identity.destination, 20)?;
    // AIS version 0, GPS, DTE ready, reserved
    w.u8(0x04).u8(0xE0);
    Ok(w.finish())
}
