use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Deserialize)]
struct Summary {
    hr: Option<u32>,
    pr: Option<f64>,
    qrs: Option<f64>,
    valid_beats: usize,
}

#[derive(Deserialize)]
struct Segment {
    summary: Summary,
    beats: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Recording {
    fs: f64,
    summary: Summary,
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
struct SegmentPeaks {
    r_peaks: Vec<f64>,
}

fn bump(t_ms: f64, center: f64, width: f64, amp: f64) -> f64 {
    amp * (-0.5 * ((t_ms - center) / width).powi(2)).exp()
}

/// Deterministic low-amplitude noise in `[-0.01, 0.01]`.
fn ripple(i: usize) -> f64 {
    0.01 * ((i * 7919 % 13) as f64 / 6.0 - 1.0)
}

/// Ten slightly noisy beats at 100 Hz, 80 samples (800 ms) apart.
fn synthetic_voltages() -> Vec<f64> {
    let (beats, rr, first_r) = (10usize, 80usize, 60usize);
    (0..first_r + beats * rr)
        .map(|i| {
            let t = i as f64 * 10.0;
            (0..beats)
                .map(|b| {
                    let r = (first_r + b * rr) as f64 * 10.0;
                    bump(t, r - 200.0, 25.0, 0.15)
                        + bump(t, r - 40.0, 10.0, -0.1)
                        + bump(t, r, 12.0, 1.2)
                        + bump(t, r + 40.0, 10.0, -0.25)
                        + bump(t, r + 280.0, 60.0, 0.3)
                })
                .sum::<f64>()
                + ripple(i)
        })
        .collect()
}

fn voltage_file() -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    for v in synthetic_voltages() {
        writeln!(file, "{v}")?;
    }
    Ok(file)
}

#[test]
fn delineate_reports_every_beat() -> Result<(), Box<dyn Error>> {
    let file = voltage_file()?;
    let mut cmd = cargo_bin_cmd!("pqrst");
    cmd.args(["delineate", "--fs", "100", "--input"])
        .arg(file.path());
    let out = cmd.assert().success().get_output().stdout.clone();
    let rec: Recording = serde_json::from_slice(&out)?;
    assert_eq!(rec.fs, 100.0);
    assert_eq!(rec.segments.len(), 1);
    assert_eq!(rec.segments[0].beats.len(), 10);
    assert_eq!(rec.summary.hr, Some(75));
    assert_eq!(rec.segments[0].summary.hr, Some(75));
    assert!(rec.summary.valid_beats > 0);
    for beat in &rec.segments[0].beats {
        for wave in ["p", "q", "r", "s", "t"] {
            assert!(beat.get(wave).is_some(), "missing {wave}");
        }
    }
    Ok(())
}

#[test]
fn delineate_aggregates_high_rate_input() -> Result<(), Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    for v in synthetic_voltages() {
        writeln!(file, "{v}\n{v}")?;
    }
    let mut cmd = cargo_bin_cmd!("pqrst");
    cmd.args(["delineate", "--fs", "200", "--input"])
        .arg(file.path());
    let out = cmd.assert().success().get_output().stdout.clone();
    let rec: Recording = serde_json::from_slice(&out)?;
    assert_eq!(rec.fs, 100.0);
    assert_eq!(rec.summary.hr, Some(75));
    Ok(())
}

#[test]
fn delineate_direct_pairs() -> Result<(), Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "time,voltage")?;
    for (i, v) in synthetic_voltages().into_iter().enumerate() {
        writeln!(file, "{i},{v}")?;
    }
    let mut cmd = cargo_bin_cmd!("pqrst");
    cmd.args(["delineate", "--direct", "--fs", "100", "--input"])
        .arg(file.path());
    let out = cmd.assert().success().get_output().stdout.clone();
    let rec: Recording = serde_json::from_slice(&out)?;
    assert_eq!(rec.summary.hr, Some(75));
    Ok(())
}

#[test]
fn delineate_reads_config_file() -> Result<(), Box<dyn Error>> {
    let file = voltage_file()?;
    let mut config = NamedTempFile::new()?;
    writeln!(config, "baseline_filter = \"median\"")?;
    writeln!(config, "min_t_wave_height = 0.05")?;
    let mut cmd = cargo_bin_cmd!("pqrst");
    cmd.args(["delineate", "--config"])
        .arg(config.path())
        .arg("--input")
        .arg(file.path());
    let out = cmd.assert().success().get_output().stdout.clone();
    let rec: Recording = serde_json::from_slice(&out)?;
    assert_eq!(rec.summary.hr, Some(75));
    Ok(())
}

#[test]
fn every_baseline_filter_measures_intervals() -> Result<(), Box<dyn Error>> {
    let file = voltage_file()?;
    for filter in ["LOWPASS", "MEAN", "MEDIAN"] {
        let mut cmd = cargo_bin_cmd!("pqrst");
        cmd.args(["delineate", "--baseline-filter", filter, "--input"])
            .arg(file.path());
        let out = cmd.assert().success().get_output().stdout.clone();
        let rec: Recording = serde_json::from_slice(&out)?;
        assert!(rec.summary.valid_beats > 0, "{filter}");
        let pr = rec.summary.pr.ok_or("missing pr")?;
        let qrs = rec.summary.qrs.ok_or("missing qrs")?;
        assert!((150.0..=250.0).contains(&pr), "{filter}: pr={pr}");
        assert!((100.0..=220.0).contains(&qrs), "{filter}: qrs={qrs}");
    }
    Ok(())
}

#[test]
fn non_positive_frequency_fails() -> Result<(), Box<dyn Error>> {
    let file = voltage_file()?;
    for command in ["delineate", "find-rpeaks"] {
        let mut cmd = cargo_bin_cmd!("pqrst");
        cmd.args([command, "--fs", "0", "--input"]).arg(file.path());
        cmd.assert().failure();
    }
    Ok(())
}

#[test]
fn unknown_baseline_filter_fails() -> Result<(), Box<dyn Error>> {
    let file = voltage_file()?;
    let mut cmd = cargo_bin_cmd!("pqrst");
    cmd.args(["delineate", "--baseline-filter", "wavelet", "--input"])
        .arg(file.path());
    cmd.assert().failure();
    Ok(())
}

#[test]
fn find_rpeaks_splits_on_missing_samples() -> Result<(), Box<dyn Error>> {
    let voltages = synthetic_voltages();
    let mut file = NamedTempFile::new()?;
    for (i, v) in voltages.iter().enumerate() {
        if i == 420 {
            writeln!(file, "nan")?;
        } else {
            writeln!(file, "{v}")?;
        }
    }
    let mut cmd = cargo_bin_cmd!("pqrst");
    cmd.args(["find-rpeaks", "--input"]).arg(file.path());
    let out = cmd.assert().success().get_output().stdout.clone();
    let segments: Vec<SegmentPeaks> = serde_json::from_slice(&out)?;
    assert_eq!(segments.len(), 2);
    let total: usize = segments.iter().map(|s| s.r_peaks.len()).sum();
    assert_eq!(total, 10);
    assert!((segments[0].r_peaks[0] - 600.0).abs() <= 10.0);
    Ok(())
}
