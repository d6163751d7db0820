//! The binary snapshot wire format: a simulated time, the live segment
//! arena (reusing [`crate::segment::Segment::write`]/[`crate::edge::Edge::write`]),
//! and a trailing `(mtnummax, nn1max, nn2max, sequence)` footer.
//!
//! Encoding streams straight off a live [`Structure`] for the driver's
//! hot path. Decoding reconstructs a plain, independent record rather
//! than a live `Structure` — tests and tooling that need to assert on a
//! recorded snapshot should not have to re-derive simulation state to do
//! it.

use std::io::{self, Read, Write};

use crate::structure::Structure;

/// One decoded edge: `(ind, indcl, cl, fin[0], fin[1])`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEdge {
    pub ind: u64,
    pub indcl: u64,
    pub cl: u64,
    pub fin: [u64; 2],
}

/// One decoded segment: length, cluster, per-end neighbour pairs, then
/// its edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSegment {
    pub length: u64,
    pub cl: u64,
    pub neighbours_one: Vec<(u64, u64)>,
    pub neighbours_two: Vec<(u64, u64)>,
    pub edges: Vec<DecodedEdge>,
}

/// One decoded snapshot record.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedSnapshot {
    pub time: f64,
    pub segments: Vec<DecodedSegment>,
    pub mtnummax: u64,
    pub nn1max: u64,
    pub nn2max: u64,
    pub sequence: u64,
}

/// Writes one snapshot record for `structure` at simulated `time`,
/// tagged with the running maxima `(mtnummax, nn1max, nn2max)` and
/// `sequence` index. The "last" snapshot of a run is written the same
/// way with `sequence = 0`.
///
/// # Errors
/// Returns an I/O error if `sink` fails to accept a write.
pub fn write_record(
    sink: &mut impl Write,
    structure: &Structure,
    time: f64,
    mtnummax: u64,
    nn1max: u64,
    nn2max: u64,
    sequence: u64,
) -> io::Result<()> {
    sink.write_all(&time.to_le_bytes())?;
    sink.write_all(&(structure.segment_count() as u64).to_le_bytes())?;
    for segment in structure.segments() {
        segment.write(sink)?;
    }
    for value in [mtnummax, nn1max, nn2max, sequence] {
        sink.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Reads one snapshot record back as a plain, independent value.
///
/// # Errors
/// Returns an I/O error if `source` ends before a complete record has
/// been read, or otherwise fails.
pub fn read_record(source: &mut impl Read) -> io::Result<DecodedSnapshot> {
    let time = read_f64(source)?;
    let segment_count = read_u64(source)?;

    let mut segments = Vec::with_capacity(segment_count as usize);
    for _ in 0..segment_count {
        segments.push(read_segment(source)?);
    }

    let mtnummax = read_u64(source)?;
    let nn1max = read_u64(source)?;
    let nn2max = read_u64(source)?;
    let sequence = read_u64(source)?;

    Ok(DecodedSnapshot { time, segments, mtnummax, nn1max, nn2max, sequence })
}

fn read_segment(source: &mut impl Read) -> io::Result<DecodedSegment> {
    let length = read_u64(source)?;
    let cl = read_u64(source)?;
    let neighbours_one = read_neighbours(source)?;
    let neighbours_two = read_neighbours(source)?;

    let mut edges = Vec::with_capacity(length as usize);
    for _ in 0..length {
        edges.push(read_edge(source)?);
    }

    Ok(DecodedSegment { length, cl, neighbours_one, neighbours_two, edges })
}

fn read_neighbours(source: &mut impl Read) -> io::Result<Vec<(u64, u64)>> {
    let count = read_u64(source)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let seg = read_u64(source)?;
        let end = read_u64(source)?;
        out.push((seg, end));
    }
    Ok(out)
}

fn read_edge(source: &mut impl Read) -> io::Result<DecodedEdge> {
    let ind = read_u64(source)?;
    let indcl = read_u64(source)?;
    let cl = read_u64(source)?;
    let fin0 = read_u64(source)?;
    let fin1 = read_u64(source)?;
    Ok(DecodedEdge { ind, indcl, cl, fin: [fin0, fin1] })
}

fn read_u64(source: &mut impl Read) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    source.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f64(source: &mut impl Read) -> io::Result<f64> {
    let mut buf = [0u8; 8];
    source.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Structure;

    #[test]
    fn round_trips_a_seeded_structure() {
        let s = Structure::seed_linear(16, 4);
        let mut buf = Vec::new();
        write_record(&mut buf, &s, 12.5, 4, 2, 0, 7).unwrap();

        let mut cursor = buf.as_slice();
        let decoded = read_record(&mut cursor).unwrap();

        assert_eq!(decoded.time, 12.5);
        assert_eq!(decoded.segments.len(), s.segment_count());
        assert_eq!(decoded.mtnummax, 4);
        assert_eq!(decoded.nn1max, 2);
        assert_eq!(decoded.nn2max, 0);
        assert_eq!(decoded.sequence, 7);
        for segment in &decoded.segments {
            assert_eq!(segment.length, 4);
            assert!(segment.neighbours_one.is_empty());
            assert!(segment.neighbours_two.is_empty());
            assert_eq!(segment.edges.len(), 4);
        }
    }

    #[test]
    fn truncated_stream_is_an_io_error() {
        let s = Structure::seed_linear(8, 8);
        let mut buf = Vec::new();
        write_record(&mut buf, &s, 1.0, 1, 2, 0, 0).unwrap();
        buf.truncate(buf.len() - 4);

        let mut cursor = buf.as_slice();
        assert!(read_record(&mut cursor).is_err());
    }
}
