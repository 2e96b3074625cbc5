//! SPICE deck writer.
//!
//! Deck layout: header comments, `.global VDD GND`, a fixed 1.8 V supply, one
//! line per MOS device, one line per resistor parasitic, then `.tran` and
//! `.end`. The only non-deterministic line is the optional timestamp comment.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use opensilicon_core::{
    NetlistDevice, ParasiticElement, ParasiticKind, GROUND_NET, SUPPLY_NET,
};

/// Supply voltage of the generated deck.
pub const SUPPLY_VOLTAGE: f64 = 1.8;

const SI_BANDS: [(f64, &str); 8] = [
    (1e6, "M"),
    (1e3, "k"),
    (1.0, ""),
    (1e-3, "m"),
    (1e-6, "u"),
    (1e-9, "n"),
    (1e-12, "p"),
    (1e-15, "f"),
];

/// Header information for a deck.
#[derive(Debug, Clone)]
pub struct DeckHeader<'a> {
    pub title: &'a str,
    /// Written as a comment when present.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Format a value with an SI suffix at three decimals, e.g. `12.500k`.
/// A mantissa that rounds up to 1000 moves to the next band, so `999.9996`
/// prints as `1.000k`. Magnitudes below 1f fall back to scientific notation.
pub fn format_si(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    let round3 = |x: f64| (x * 1000.0).round() / 1000.0;

    let mut index = SI_BANDS
        .iter()
        .position(|(scale, _)| magnitude >= *scale)
        .unwrap_or(SI_BANDS.len());
    let carries = match SI_BANDS.get(index) {
        Some((scale, _)) => round3(magnitude / scale) >= 1000.0,
        None => round3(magnitude / SI_BANDS[SI_BANDS.len() - 1].0) >= 1.0,
    };
    if carries && index > 0 {
        index -= 1;
    }

    match SI_BANDS.get(index) {
        Some((scale, suffix)) => format!("{:.3}{}", value / scale, suffix),
        None => format!("{:.3e}", value),
    }
}

/// Render a complete deck.
pub fn render_deck(
    devices: &[NetlistDevice],
    parasitics: &[ParasiticElement],
    header: &DeckHeader<'_>,
) -> String {
    let mut out = String::new();
    let mos: Vec<&NetlistDevice> = devices.iter().filter(|d| d.kind.is_transistor()).collect();
    let resistors: Vec<&ParasiticElement> = parasitics
        .iter()
        .filter(|p| p.kind == ParasiticKind::Resistor)
        .collect();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "* {}", header.title);
    if let Some(ts) = header.timestamp {
        let _ = writeln!(out, "* Generated: {}", ts.to_rfc3339());
    }
    let _ = writeln!(
        out,
        "* Devices: {}  Parasitics: {}",
        mos.len(),
        resistors.len()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, ".global {} {}", SUPPLY_NET, GROUND_NET);
    let _ = writeln!(
        out,
        "VSUPPLY {} {} DC {}",
        SUPPLY_NET, GROUND_NET, SUPPLY_VOLTAGE
    );

    if !mos.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "* Devices");
        for device in mos {
            let _ = writeln!(out, "{}", mos_line(device));
        }
    }

    if !resistors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "* Parasitic resistors");
        for r in resistors {
            let _ = writeln!(
                out,
                "{} {} {} {}",
                r.name,
                r.node_a,
                r.node_b,
                format_si(r.value)
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, ".tran 10p 10n");
    let _ = writeln!(out, ".end");
    out
}

fn mos_line(device: &NetlistDevice) -> String {
    let net = |t: &str| device.terminal(t).unwrap_or("0");
    let mut line = format!(
        "{} {} {} {} {} {} W={:.3}u L={:.3}u",
        device.name,
        net("drain"),
        net("gate"),
        net("source"),
        net("body"),
        device.model,
        device.param("w").unwrap_or(0.0),
        device.param("l").unwrap_or(0.0),
    );
    if let Some(nf) = device.param("nf").filter(|v| *v != 1.0) {
        let _ = write!(line, " NF={}", nf);
    }
    if let Some(mult) = device.param("mult").filter(|v| *v != 1.0) {
        let _ = write!(line, " MULT={}", mult);
    }
    line
}
