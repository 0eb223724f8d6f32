//! Human-readable dumps of a graph and a partition, and the partition output file.

use std::io::{self, Write};

use crate::graph::Hypergraph;
use crate::partition::Partition;

/// Writes the graph summary followed by every net and every cell's net list.
pub fn print_graph(graph: &Hypergraph, noparts: usize, mut out: impl Write) -> io::Result<()> {
    let s = graph.stats();
    writeln!(out, "Graph Information -----------------------------------------------------------")?;
    writeln!(
        out,
        " #Cells: {}, #Nets: {}, #Pins: {}, #Parts: {}",
        s.nocells, s.nonets, s.nopins, noparts
    )?;
    writeln!(
        out,
        " cell weights: total {} min {} max {}, max net weight {}, max cell degree {}",
        s.totcellsize, s.min_cweight, s.max_cweight, s.max_nweight, s.max_density
    )?;
    writeln!(out)?;
    for (n, pins) in graph.netlist().enumerate() {
        write!(out, "net {n} (w {}):", graph.net_weight(n))?;
        for c in pins {
            write!(out, " {c}")?;
        }
        writeln!(out)?;
    }
    for c in 0..graph.nocells() {
        write!(out, "cell {c} (w {}):", graph.cell_weight(c))?;
        for n in graph.nets_of(c) {
            write!(out, " {n}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the bounds and current size of each partition and the cells it holds.
pub fn print_parts_info(partition: &Partition, mut out: impl Write) -> io::Result<()> {
    writeln!(out, "Partitions ------------------------------------------------------------------")?;
    writeln!(out, " part  min_size  curr_size  max_size  cells")?;
    for (i, info) in partition.parts().iter().enumerate() {
        let ncells = partition.assignment().iter().filter(|&&p| p == i).count();
        writeln!(
            out,
            " {:>4}  {:>8}  {:>9}  {:>8}  {:>5}",
            i, info.pmin_size, info.pcurr_size, info.pmax_size, ncells
        )?;
    }
    Ok(())
}

/// Writes the assignment as `[ p0, p1, ..., pn ]` on one line.
pub fn print_vertex_partition(partition: &Partition, mut out: impl Write) -> io::Result<()> {
    let chrom = partition.assignment();
    write!(out, "[ ")?;
    for (v, p) in chrom.iter().enumerate() {
        let sep = if v + 1 < chrom.len() { "," } else { "" };
        write!(out, "{p}{sep} ")?;
    }
    writeln!(out, "]")
}

#[cfg(test)]
mod test {
    use super::*;

    fn example() -> (Hypergraph, Partition) {
        let g = Hypergraph::new(vec![1; 4], vec![1, 2], vec![vec![0, 1], vec![1, 2, 3]]).unwrap();
        let p = Partition::from_assignment(&g, 2, 30, vec![0, 1, 1, 1]).unwrap();
        (g, p)
    }

    #[test]
    fn vertex_partition_line() {
        let (_, p) = example();
        let mut out = Vec::new();
        print_vertex_partition(&p, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[ 0, 1, 1, 1 ]\n");
    }

    #[test]
    fn summaries() {
        let (g, p) = example();
        let mut out = Vec::new();
        print_graph(&g, 2, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("#Cells: 4, #Nets: 2, #Pins: 5"));
        assert!(text.contains("net 1 (w 2): 1 2 3"));
        assert!(text.contains("cell 1 (w 1): 0 1"));

        let mut out = Vec::new();
        print_parts_info(&p, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let rows: Vec<_> = text.lines().skip(2).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1].split_whitespace().collect::<Vec<_>>(),
            ["1", "1", "3", "3", "3"]
        );
    }
}
