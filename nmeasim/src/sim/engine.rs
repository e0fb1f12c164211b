//! Synchronous per-tick work: advance every vessel, then encode.
//!
//! The engine owns all vessel models and encoders and has no I/O, so a tick
//! is deterministic for a given configuration and start time.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::output::{EncodedSentence, OutputKind, Source};
use crate::ais::{AisEncoder, AisMessageType};
use crate::config::{ConfigError, ProtocolMode, SimulationConfig};
use crate::environment::EnvironmentState;
use crate::error::EncodeError;
use crate::nmea0183::{SentenceContext, SentenceEncoder, SentenceKind};
use crate::nmea2000::{N2kEncoder, Pgn};
use crate::vessel::{VesselModel, VesselState};

/// Output of one tick.
#[derive(Debug, Default)]
pub struct TickOutput {
    pub sentences: Vec<EncodedSentence>,
    pub encode_errors: u64,
}

/// When a traffic vessel's AIS messages are next due.
#[derive(Debug, Clone, Copy)]
struct AisSchedule {
    next_report: Duration,
    next_static: Duration,
}

impl AisSchedule {
    fn new() -> Self {
        Self {
            next_report: Duration::ZERO,
            next_static: Duration::ZERO,
        }
    }

    /// Which messages are due at `elapsed`; advances the schedule.
    fn due(&mut self, elapsed: Duration, report: Duration, stat: Duration) -> (bool, bool) {
        let report_due = elapsed >= self.next_report;
        if report_due {
            self.next_report = elapsed + report;
        }
        let static_due = elapsed >= self.next_static;
        if static_due {
            self.next_static = elapsed + stat;
        }
        (report_due, static_due)
    }
}

/// Owns every vessel and encoder of a running simulation.
pub struct Engine {
    vessels: Vec<VesselModel>,
    schedules: Vec<AisSchedule>,
    environment: Arc<EnvironmentState>,
    protocol: ProtocolMode,
    sentences: Vec<SentenceKind>,
    pgns: Vec<Pgn>,
    sentence_encoder: SentenceEncoder,
    ais_encoder: AisEncoder,
    n2k_encoder: N2kEncoder,
    report_interval: Duration,
    static_interval: Duration,
    period: Duration,
    start_time: DateTime<Utc>,
    ticks: u64,
}

impl Engine {
    /// Build vessels and encoders from `config`, with simulated time
    /// starting at `start_time`.
    pub fn new(config: &SimulationConfig, start_time: DateTime<Utc>) -> Result<Self, ConfigError> {
        let vessels = config.build_vessels()?;
        let schedules = vec![AisSchedule::new(); vessels.len()];
        Ok(Self {
            vessels,
            schedules,
            environment: Arc::new(config.environment.clone()),
            protocol: config.protocol,
            sentences: config.sentences.enabled().to_vec(),
            pgns: config.pgns.clone(),
            sentence_encoder: config.sentence_encoder()?,
            ais_encoder: AisEncoder::new(),
            n2k_encoder: config.n2k_encoder(),
            report_interval: config.ais.report_interval,
            static_interval: config.ais.static_interval,
            period: config.tick_period(),
            start_time,
            ticks: 0,
        })
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time since the start.
    pub fn elapsed(&self) -> Duration {
        let ticks = u32::try_from(self.ticks).unwrap_or(u32::MAX);
        self.period.saturating_mul(ticks)
    }

    /// Simulated UTC of the last completed tick.
    pub fn sim_time(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.start_time + elapsed
    }

    pub fn vessels(&self) -> &[VesselModel] {
        &self.vessels
    }

    pub fn own_ship(&self) -> Option<&VesselState> {
        self.vessels.first().map(VesselModel::state)
    }

    /// Advance every vessel by one period and encode the result.
    ///
    /// Encode failures are logged and counted; the rest of the tick goes on.
    pub fn tick(&mut self) -> TickOutput {
        self.ticks += 1;
        let elapsed = self.elapsed();
        let at = self.sim_time();

        for vessel in &mut self.vessels {
            vessel.tick(self.period);
        }

        if self.protocol.emits_2000() {
            self.n2k_encoder.next_tick();
        }

        let mut out = TickOutput::default();
        for index in 0..self.vessels.len() {
            if index == 0 {
                self.encode_own_ship(at, &mut out);
            } else {
                let (report, stat) = self.schedules[index].due(
                    elapsed,
                    self.report_interval,
                    self.static_interval,
                );
                self.encode_traffic(index, at, report, stat, &mut out);
            }
        }
        out
    }

    fn encode_own_ship(&mut self, at: DateTime<Utc>, out: &mut TickOutput) {
        let vessel = &self.vessels[0];
        let source = Source::OwnShip(vessel.identity().mmsi);
        let ctx = SentenceContext {
            time: at,
            state: vessel.state(),
            environment: &self.environment,
            tracker: vessel.tracker(),
        };

        if self.protocol.emits_0183() {
            for &kind in &self.sentences {
                let result = self
                    .sentence_encoder
                    .encode(kind, &ctx)
                    .map(|sentence| vec![Bytes::from(sentence)]);
                push(out, at, source, OutputKind::Sentence(kind), result);
            }
        }

        if self.protocol.emits_2000() {
            for &pgn in self.pgns.iter().filter(|p| !p.is_ais()) {
                let result = self.n2k_encoder.encode(pgn, &ctx, vessel.identity());
                push(out, at, source, OutputKind::Pgn(pgn), result);
            }
        }
    }

    fn encode_traffic(
        &mut self,
        index: usize,
        at: DateTime<Utc>,
        report: bool,
        stat: bool,
        out: &mut TickOutput,
    ) {
        let vessel = &self.vessels[index];
        let identity = vessel.identity();
        let source = Source::Traffic(identity.mmsi);

        if self.protocol.emits_0183() {
            if report {
                let result = self
                    .ais_encoder
                    .position_report(identity, vessel.state(), &at)
                    .map(into_bytes);
                let kind = OutputKind::Ais(AisMessageType::PositionReport);
                push(out, at, source, kind, result);
            }
            if stat {
                let result = self.ais_encoder.static_voyage(identity).map(into_bytes);
                let kind = OutputKind::Ais(AisMessageType::StaticVoyage);
                push(out, at, source, kind, result);
            }
        }

        if self.protocol.emits_2000() {
            let ctx = SentenceContext {
                time: at,
                state: vessel.state(),
                environment: &self.environment,
                tracker: None,
            };
            for (due, pgn) in [(report, Pgn::AisClassAPosition), (stat, Pgn::AisClassAStatic)] {
                if due && self.pgns.contains(&pgn) {
                    let result = self.n2k_encoder.encode(pgn, &ctx, identity);
                    push(out, at, source, OutputKind::Pgn(pgn), result);
                }
            }
        }
    }
}

fn into_bytes(sentences: Vec<String>) -> Vec<Bytes> {
    sentences.into_iter().map(Bytes::from).collect()
}

/// Append the records of one encode call, or count its failure.
fn push(
    out: &mut TickOutput,
    at: DateTime<Utc>,
    source: Source,
    kind: OutputKind,
    result: Result<Vec<Bytes>, EncodeError>,
) {
    match result {
        Ok(records) => out
            .sentences
            .extend(records.into_iter().map(|payload| EncodedSentence {
                timestamp: at,
                source,
                kind,
                payload,
            })),
        Err(e) => {
            out.encode_errors += 1;
            tracing::warn!(
                mmsi = %source.mmsi(),
                kind = %kind,
                error = %e,
                "Failed to encode output"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScenarioFile, SpeedSettings};
    use crate::nmea0183::checksum;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn engine(mut scenario: ScenarioFile) -> Engine {
        if scenario.waypoints.is_empty() {
            scenario.waypoints = vec!["37.7,-122.3".into(), "37.8,-122.3".into()];
            scenario.speed_profile = vec![SpeedSettings {
                duration: None,
                speed: 6.0,
            }];
        }
        let config = SimulationConfig::from_scenario(&scenario).unwrap();
        Engine::new(&config, start()).unwrap()
    }

    #[test]
    fn test_own_ship_sentences_in_kind_order() {
        let mut engine = engine(ScenarioFile::default());
        let out = engine.tick();

        assert_eq!(out.encode_errors, 0);
        let kinds: Vec<OutputKind> = out.sentences.iter().map(|s| s.kind).collect();
        let expected: Vec<OutputKind> = SentenceKind::ALL
            .into_iter()
            .map(OutputKind::Sentence)
            .collect();
        assert_eq!(kinds, expected);

        for sentence in &out.sentences {
            let text = sentence.as_text().unwrap();
            assert!(text.ends_with("\r\n"));
            assert!(checksum::verify(text), "{}", text);
            assert_eq!(sentence.timestamp, start() + chrono::Duration::seconds(1));
        }
    }

    #[test]
    fn test_sim_time_advances_by_period() {
        let mut scenario = ScenarioFile::default();
        scenario.update_rate = 4.0;
        let mut engine = engine(scenario);
        for _ in 0..8 {
            engine.tick();
        }
        assert_eq!(engine.ticks(), 8);
        assert_eq!(engine.elapsed(), Duration::from_secs(2));
        assert_eq!(engine.sim_time(), start() + chrono::Duration::seconds(2));
    }

    #[test]
    fn test_ais_cadence() {
        let mut scenario = ScenarioFile::example();
        scenario.ais_vessels.truncate(1);
        scenario.sentences.include = Some(vec![]);
        scenario.ais.report_interval = crate::config::DurationValue::Seconds(3.0);
        scenario.ais.static_interval = crate::config::DurationValue::Seconds(6.0);
        let mut engine = engine(scenario);

        let mut reports = Vec::new();
        let mut statics = Vec::new();
        for tick in 1..=12 {
            let out = engine.tick();
            for s in &out.sentences {
                match s.kind {
                    OutputKind::Ais(AisMessageType::PositionReport) => reports.push(tick),
                    OutputKind::Ais(AisMessageType::StaticVoyage) => statics.push(tick),
                    other => panic!("unexpected {other}"),
                }
            }
        }
        // Both go out on the first tick; type 5 takes two fragments
        assert_eq!(reports, vec![1, 4, 7, 10]);
        assert_eq!(statics, vec![1, 1, 7, 7]);
    }

    #[test]
    fn test_nmea2000_mode_emits_pgns_only() {
        let mut scenario = ScenarioFile::default();
        scenario.nmea_version = ProtocolMode::Nmea2000;
        let mut engine = engine(scenario);
        let out = engine.tick();

        assert!(out.sentences.iter().all(|s| !s.kind.is_nmea0183()));
        let pgns: Vec<OutputKind> = out.sentences.iter().map(|s| s.kind).collect();
        // Wind data is emitted twice: apparent, then true
        assert_eq!(pgns.len(), Pgn::OWN_SHIP.len() + 1);
        assert_eq!(pgns[0], OutputKind::Pgn(Pgn::SystemTime));
    }

    #[test]
    fn test_both_mode_with_traffic() {
        let mut scenario = ScenarioFile::example();
        scenario.nmea_version = ProtocolMode::Both;
        scenario.ais_vessels.truncate(2);
        let mut engine = engine(scenario);
        let out = engine.tick();

        let traffic: Vec<&EncodedSentence> = out
            .sentences
            .iter()
            .filter(|s| !s.source.is_own_ship())
            .collect();
        let count = |kind: OutputKind| traffic.iter().filter(|s| s.kind == kind).count();
        assert_eq!(count(OutputKind::Ais(AisMessageType::PositionReport)), 2);
        assert_eq!(count(OutputKind::Ais(AisMessageType::StaticVoyage)), 4);
        assert_eq!(count(OutputKind::Pgn(Pgn::AisClassAPosition)), 2);
        assert_eq!(count(OutputKind::Pgn(Pgn::AisClassAStatic)), 2);

        // Own ship first, then traffic in configuration order
        let first_traffic = out
            .sentences
            .iter()
            .position(|s| !s.source.is_own_ship())
            .unwrap();
        assert!(out.sentences[first_traffic..]
            .iter()
            .all(|s| !s.source.is_own_ship()));
        assert_eq!(traffic[0].source.mmsi().value(), 366_123_456);
    }

    #[test]
    fn test_excluded_sentences_never_emitted() {
        let mut scenario = ScenarioFile::default();
        scenario.sentences.exclude = vec!["RSA".into(), "MWV".into()];
        let mut engine = engine(scenario);
        let out = engine.tick();
        assert!(out.sentences.iter().all(|s| !matches!(
            s.kind,
            OutputKind::Sentence(SentenceKind::Rsa)
                | OutputKind::Sentence(SentenceKind::MwvTrue)
                | OutputKind::Sentence(SentenceKind::MwvRelative)
        )));
    }
}
