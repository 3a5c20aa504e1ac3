//! Anchors discrete drawdown events onto the equity curve.
//!
//! Event starts and series timestamps are compared as structured time: a
//! date-only start anchors on the first timestamp of that calendar day, a
//! date-time start on the first equal timestamp. Offsets are normalized to UTC.
//! Text that does not parse falls back to a literal prefix test.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::chart::theme::{Rgb, NEGATIVE, POSITIVE};
use crate::report::{display, number, EquitySeries, Row};

/// Events shown in the table and overlay.
pub const TOP_N: usize = 7;

pub const START_COLUMN: &str = "Start";
pub const DEPTH_COLUMN: &str = "Depth";

const DATETIME_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

// ─── Structured time ───

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stamp {
    Day(NaiveDate),
    /// UTC wall time.
    At(NaiveDateTime),
}

fn parse_stamp(s: &str) -> Option<Stamp> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Stamp::At(dt.with_timezone(&Utc).naive_utc()));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(Stamp::At(dt.with_timezone(&Utc).naive_utc()));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Stamp::At(dt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(Stamp::Day)
}

fn stamp_matches(start: Stamp, ts: Stamp) -> bool {
    match (start, ts) {
        (Stamp::Day(d), Stamp::At(t)) => t.date() == d,
        (Stamp::Day(d), Stamp::Day(e)) => d == e,
        (Stamp::At(a), Stamp::At(b)) => a == b,
        (Stamp::At(a), Stamp::Day(e)) => a == e.and_time(NaiveTime::MIN),
    }
}

/// Index of the first series timestamp the start text anchors on.
pub fn anchor_index(start: &str, times: &[String]) -> Option<usize> {
    let parsed: Vec<Option<Stamp>> = times.iter().map(|t| parse_stamp(t)).collect();
    anchor_in(start, times, &parsed)
}

fn anchor_in(start: &str, times: &[String], parsed: &[Option<Stamp>]) -> Option<usize> {
    let start_stamp = parse_stamp(start);
    times.iter().zip(parsed).position(|(raw, stamp)| match (start_stamp, stamp) {
        (Some(s), Some(t)) => stamp_matches(s, *t),
        _ => raw.starts_with(start),
    })
}

// ─── Alignment ───

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Equity at the anchor is at or above the starting balance.
    Recovered,
    Loss,
}

impl MarkerKind {
    pub fn color(self) -> Rgb {
        match self {
            MarkerKind::Recovered => POSITIVE,
            MarkerKind::Loss => NEGATIVE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DrawdownMarker {
    /// Position within the top events.
    pub event_idx: usize,
    pub series_idx: usize,
    pub time: String,
    pub equity: f64,
    pub kind: MarkerKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawdownAlignment<'a> {
    /// Deepest events first, ties in input order.
    pub top: Vec<&'a Row>,
    /// One per anchored event; unanchored events have none.
    pub markers: Vec<DrawdownMarker>,
}

/// The [`TOP_N`] deepest events, stable on ties.
pub fn top_events(events: &[Row]) -> Vec<&Row> {
    let mut sorted: Vec<&Row> = events.iter().collect();
    sorted.sort_by(|a, b| {
        let da = number(a.get(DEPTH_COLUMN));
        let db = number(b.get(DEPTH_COLUMN));
        db.partial_cmp(&da).unwrap_or(Ordering::Equal)
    });
    sorted.truncate(TOP_N);
    sorted
}

pub fn align<'a>(events: &'a [Row], series: &EquitySeries) -> DrawdownAlignment<'a> {
    let top = top_events(events);
    let Some(initial) = series.initial() else {
        return DrawdownAlignment { top, markers: Vec::new() };
    };

    let parsed: Vec<Option<Stamp>> = series.time.iter().map(|t| parse_stamp(t)).collect();
    let markers = top
        .iter()
        .enumerate()
        .filter_map(|(event_idx, event)| {
            let start = display(event.get(START_COLUMN));
            let i = anchor_in(&start, &series.time, &parsed)?;
            let equity = series.equity[i];
            let kind = if equity >= initial { MarkerKind::Recovered } else { MarkerKind::Loss };
            Some(DrawdownMarker { event_idx, series_idx: i, time: series.time[i].clone(), equity, kind })
        })
        .collect();

    DrawdownAlignment { top, markers }
}
