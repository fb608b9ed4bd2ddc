//! Append-only sample sinks for integration output
//!
//! One sink per run: the driver creates the sink, fills it in
//! chronological order of acceptance, and returns it by value. Nothing
//! is ever cleared or reused across runs.

use std::io::{self, Write};

/// One accepted scalar sample. `h` is the integrator's step size at
/// recording time, i.e. the size the next attempt will use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub h: f64,
}

/// Ordered scalar integration output, initial condition first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, x: f64, y: f64, h: f64) {
        self.samples.push(Sample { x, y, h });
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recorded samples in chronological order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Save the trajectory to a CSV file with `x,y,h` columns.
    ///
    /// Appends a `.csv` extension if the filename lacks one.
    pub fn save(&self, filename: &str) -> io::Result<()> {
        self.save_with_labels(filename, &["x", "y", "h"])
    }

    /// Save the trajectory to a CSV file with custom column labels.
    pub fn save_with_labels(&self, filename: &str, labels: &[&str; 3]) -> io::Result<()> {
        let filename = if filename.to_lowercase().ends_with(".csv") {
            filename.to_string()
        } else {
            format!("{}.csv", filename)
        };
        let file = std::fs::File::create(filename)?;
        self.save_to_writer(file, labels)
    }

    /// Save the trajectory to any writer, e.g. a string buffer in
    /// tests.
    pub fn save_to_writer<W: Write>(&self, writer: W, labels: &[&str; 3]) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(labels)?;
        for s in &self.samples {
            wtr.write_record(&[s.x.to_string(), s.y.to_string(), s.h.to_string()])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// One accepted coupled sample in the phase plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSample {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub h: f64,
}

/// Ordered coupled integration output, initial condition first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseTrajectory {
    samples: Vec<PhaseSample>,
}

impl PhaseTrajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, t: f64, x: f64, y: f64, h: f64) {
        self.samples.push(PhaseSample { t, x, y, h });
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recorded samples in chronological order.
    pub fn samples(&self) -> &[PhaseSample] {
        &self.samples
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<&PhaseSample> {
        self.samples.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhaseSample> {
        self.samples.iter()
    }

    /// Save the trajectory to a CSV file with `t,x,y,h` columns.
    ///
    /// Appends a `.csv` extension if the filename lacks one.
    pub fn save(&self, filename: &str) -> io::Result<()> {
        self.save_with_labels(filename, &["t", "x", "y", "h"])
    }

    /// Save the trajectory to a CSV file with custom column labels.
    pub fn save_with_labels(&self, filename: &str, labels: &[&str; 4]) -> io::Result<()> {
        let filename = if filename.to_lowercase().ends_with(".csv") {
            filename.to_string()
        } else {
            format!("{}.csv", filename)
        };
        let file = std::fs::File::create(filename)?;
        self.save_to_writer(file, labels)
    }

    /// Save the trajectory to any writer.
    pub fn save_to_writer<W: Write>(&self, writer: W, labels: &[&str; 4]) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(labels)?;
        for s in &self.samples {
            wtr.write_record(&[
                s.t.to_string(),
                s.x.to_string(),
                s.y.to_string(),
                s.h.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a PhaseTrajectory {
    type Item = &'a PhaseSample;
    type IntoIter = std::slice::Iter<'a, PhaseSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
