//! Reading and writing hypergraphs in the hMETIS `.hgr` format
//!
//! ```text
//! % comment
//! <nonets> <nocells> [fmt]
//! [weight] pin pin ...        one line per net, pins numbered from 1
//! weight                      one line per cell, only when fmt is 10 or 11
//! ```
//!
//! `fmt` is 1 for net weights, 10 for cell weights, 11 for both. Comment and blank lines are
//! skipped anywhere.

use std::fs::OpenOptions;
use std::io::{self, prelude::*, BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use crate::defs::Weight;
use crate::error::{Error, Result};
use crate::graph::Hypergraph;

/// Counts above this are not trusted for preallocation; the vectors grow as lines are read.
const MAX_PREALLOC: usize = 1 << 16;

/// Header of a `.hgr` file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub nonets: usize,
    pub nocells: usize,
    pub has_nwgt: bool,
    pub has_cwgt: bool,
}

/// Line source that skips comments and blank lines and remembers where it is for error messages.
struct Lines<R> {
    r: R,
    buf: String,
    lineno: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(r: R) -> Self {
        Self {
            r,
            buf: String::with_capacity(256),
            lineno: 0,
        }
    }

    /// next meaningful line and its (1-based) number
    fn next_line(&mut self) -> Result<Option<(usize, &str)>> {
        loop {
            self.buf.clear();
            if self.r.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.lineno += 1;
            let trimmed = self.buf.trim();
            if trimmed.is_empty() || trimmed.starts_with('%') {
                continue;
            }
            return Ok(Some((self.lineno, self.buf.trim())));
        }
    }

    fn expect_line(&mut self, what: &str) -> Result<(usize, &str)> {
        let lineno = self.lineno;
        match self.next_line()? {
            Some(l) => Ok(l),
            None => Err(Error::parse(
                lineno + 1,
                format!("premature end of file, expected {what}"),
            )),
        }
    }
}

fn field<T: FromStr>(s: &str, line: usize, what: &str) -> Result<T> {
    s.parse()
        .map_err(|_| Error::parse(line, format!("invalid {what} {s:?}")))
}

/// Parses the header, returning it with its line number.
fn read_header<R: BufRead>(lines: &mut Lines<R>) -> Result<(usize, Header)> {
    let (line, text) = lines.expect_line("header")?;
    let fields: Vec<&str> = text.split_ascii_whitespace().collect();
    if fields.len() < 2 || fields.len() > 3 {
        return Err(Error::parse(
            line,
            format!("header needs 2 or 3 fields, found {}", fields.len()),
        ));
    }
    let nonets = field(fields[0], line, "net count")?;
    let nocells = field(fields[1], line, "cell count")?;
    let fmt: u32 = match fields.get(2) {
        Some(f) => field(f, line, "fmt")?,
        None => 0,
    };
    let (has_nwgt, has_cwgt) = match fmt {
        0 => (false, false),
        1 => (true, false),
        10 => (false, true),
        11 => (true, true),
        _ => return Err(Error::parse(line, format!("invalid fmt {fmt}"))),
    };
    Ok((
        line,
        Header {
            nonets,
            nocells,
            has_nwgt,
            has_cwgt,
        },
    ))
}

/// Reads only the header of a hypergraph file, returning `(nocells, nonets)`.
pub fn read_graph_size(path: impl AsRef<Path>) -> Result<(usize, usize)> {
    let f = OpenOptions::new().read(true).open(path)?;
    let (_, header) = read_header(&mut Lines::new(BufReader::new(f)))?;
    Ok((header.nocells, header.nonets))
}

/// Reads a whole hypergraph file.
pub fn read_graph(path: impl AsRef<Path>) -> Result<Hypergraph> {
    let f = OpenOptions::new().read(true).open(path)?;
    read(BufReader::with_capacity(32 * 1024, f))
}

pub fn read(r: impl BufRead) -> Result<Hypergraph> {
    let mut lines = Lines::new(r);
    let (header_line, header) = read_header(&mut lines)?;
    let Header {
        nonets,
        nocells,
        has_nwgt,
        has_cwgt,
    } = header;

    let mut nwgt: Vec<Weight> = Vec::with_capacity(nonets.min(MAX_PREALLOC));
    let mut netlist: Vec<Vec<usize>> = Vec::with_capacity(nonets.min(MAX_PREALLOC));
    for _ in 0..nonets {
        let (line, text) = lines.expect_line("net line")?;
        let mut fields = text.split_ascii_whitespace();
        if has_nwgt {
            let w: Weight = field(fields.next().unwrap_or(""), line, "net weight")?;
            if w <= 0 {
                return Err(Error::parse(line, format!("net weight must be positive, got {w}")));
            }
            nwgt.push(w);
        } else {
            nwgt.push(1);
        }
        let mut net = Vec::new();
        for f in fields {
            let pin: usize = field(f, line, "pin")?;
            if pin == 0 || pin > nocells {
                return Err(Error::parse(
                    line,
                    format!("pin {pin} out of range 1..={nocells}"),
                ));
            }
            net.push(pin - 1);
        }
        if net.is_empty() {
            return Err(Error::parse(line, "net has no pins"));
        }
        netlist.push(net);
    }

    let mut cwgt: Vec<Weight> = Vec::with_capacity(nocells.min(MAX_PREALLOC));
    if has_cwgt {
        for _ in 0..nocells {
            let (line, text) = lines.expect_line("cell weight")?;
            let mut fields = text.split_ascii_whitespace();
            let w: Weight = field(fields.next().unwrap_or(""), line, "cell weight")?;
            if w <= 0 {
                return Err(Error::parse(line, format!("cell weight must be positive, got {w}")));
            }
            if fields.next().is_some() {
                return Err(Error::parse(line, "more than one cell weight on a line"));
            }
            cwgt.push(w);
        }
    } else {
        cwgt.try_reserve_exact(nocells).map_err(|_| {
            Error::parse(header_line, format!("cannot hold {nocells} cells"))
        })?;
        cwgt.resize(nocells, 1);
    }

    if let Some((line, text)) = lines.next_line()? {
        return Err(Error::parse(line, format!("junk after hypergraph: {text:?}")));
    }

    Hypergraph::new(cwgt, nwgt, netlist)
}

/// Writes `graph` in `.hgr` format, omitting weights that are all 1.
pub fn write(graph: &Hypergraph, mut w: impl Write) -> io::Result<()> {
    let has_nwgt = graph.net_weights().iter().any(|&w| w != 1);
    let has_cwgt = graph.cell_weights().iter().any(|&w| w != 1);
    let fmt = has_nwgt as u32 + 10 * has_cwgt as u32;

    if fmt == 0 {
        writeln!(w, "{} {}", graph.nonets(), graph.nocells())?;
    } else {
        writeln!(w, "{} {} {}", graph.nonets(), graph.nocells(), fmt)?;
    }

    for (n, pins) in graph.netlist().enumerate() {
        let mut first = true;
        if has_nwgt {
            write!(w, "{}", graph.net_weight(n))?;
            first = false;
        }
        for &c in pins {
            if !first {
                write!(w, " ")?;
            }
            write!(w, "{}", c + 1)?;
            first = false;
        }
        writeln!(w)?;
    }

    if has_cwgt {
        for &cw in graph.cell_weights() {
            writeln!(w, "{cw}")?;
        }
    }
    w.flush()
}

pub fn write_to_path(graph: &Hypergraph, p: impl AsRef<Path>) -> io::Result<()> {
    let f = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(p)?;
    write(graph, BufWriter::new(f))
}
