use crate::risk_assessment::domain::{Cvss, CvssScore};
use std::collections::HashMap;
use url::Url;

/// Computes the CVSS v3.x base score of a vector string.
///
/// Example: "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H" -> Some(9.8)
///
/// Returns `None` when the prefix is not `CVSS:3.x` or a base metric is
/// missing or has an unknown value.
pub fn base_score(vector: &str) -> Option<CvssScore> {
    let mut parts = vector.trim().split('/');
    let prefix = parts.next()?;
    if !prefix.starts_with("CVSS:3.") {
        return None;
    }

    let metrics: HashMap<&str, &str> = parts
        .filter_map(|part| {
            let mut split = part.split(':');
            Some((split.next()?, split.next()?))
        })
        .collect();

    let av = metrics.get("AV")?;
    let ac = metrics.get("AC")?;
    let pr = metrics.get("PR")?;
    let ui = metrics.get("UI")?;
    let s = metrics.get("S")?;
    let c = metrics.get("C")?;
    let i = metrics.get("I")?;
    let a = metrics.get("A")?;

    let scope_changed = match *s {
        "U" => false,
        "C" => true,
        _ => return None,
    };

    let av_score = match *av {
        "N" => 0.85,
        "A" => 0.62,
        "L" => 0.55,
        "P" => 0.2,
        _ => return None,
    };

    let ac_score = match *ac {
        "L" => 0.77,
        "H" => 0.44,
        _ => return None,
    };

    let pr_score = match (*pr, scope_changed) {
        ("N", _) => 0.85,
        ("L", false) => 0.62,
        ("L", true) => 0.68,
        ("H", false) => 0.27,
        ("H", true) => 0.5,
        _ => return None,
    };

    let ui_score = match *ui {
        "N" => 0.85,
        "R" => 0.62,
        _ => return None,
    };

    let cia = |value: &str| match value {
        "N" => Some(0.0),
        "L" => Some(0.22),
        "H" => Some(0.56),
        _ => None,
    };
    let c_score: f64 = cia(c)?;
    let i_score: f64 = cia(i)?;
    let a_score: f64 = cia(a)?;

    let iss = 1.0 - ((1.0 - c_score) * (1.0 - i_score) * (1.0 - a_score));
    let impact = if scope_changed {
        7.52 * (iss - 0.029) - 3.25 * (iss - 0.02_f64).powi(15)
    } else {
        6.42 * iss
    };
    let exploitability = 8.22 * av_score * ac_score * pr_score * ui_score;

    let score = if impact <= 0.0 {
        0.0
    } else if scope_changed {
        round_up(f64::min(1.08 * (impact + exploitability), 10.0))
    } else {
        round_up(f64::min(impact + exploitability, 10.0))
    };

    CvssScore::new(score).ok()
}

/// CVSS v3.1 `Roundup`: smallest one-decimal number >= input, computed on
/// integers so 4.000000001 does not become 4.1.
fn round_up(value: f64) -> f64 {
    let scaled = (value * 100_000.0).round() as i64;
    if scaled % 10_000 == 0 {
        scaled as f64 / 100_000.0
    } else {
        ((scaled / 10_000) + 1) as f64 / 10.0
    }
}

/// Extracts a [`Cvss`] from a FIRST calculator link such as
/// `https://www.first.org/cvss/calculator/3.1#CVSS:3.1/AV:N/...`.
pub fn from_calculator_link(link: &str) -> Option<Cvss> {
    let url = Url::parse(link.trim()).ok()?;
    if !matches!(url.host_str(), Some("www.first.org") | Some("first.org")) {
        return None;
    }
    if !url.path().starts_with("/cvss/calculator") {
        return None;
    }

    let vector = url.fragment()?.trim();
    if !vector.starts_with("CVSS:") {
        return None;
    }
    let version = vector
        .split('/')
        .next()
        .and_then(|prefix| prefix.strip_prefix("CVSS:"))
        .map(str::to_string);

    Some(Cvss {
        version,
        vector: Some(vector.to_string()),
        base_score: base_score(vector),
        url: Some(url.to_string()),
    })
}
