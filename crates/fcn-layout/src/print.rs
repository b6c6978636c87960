//! ASCII rendering of gate-level layouts
//!
//! Each tile is one character, separated by horizontal connectors; a
//! connector row follows each tile row:
//!
//! ```text
//! I>!>O
//!
//! . . .
//! ```
//!
//! Legend: `I` input, `O` output, `*` wire, `F` fanout, `+` crossing,
//! `&` AND, `|` OR, `X` XOR, `D` NAND, `R` NOR, `=` XNOR, `!` NOT,
//! `M` MAJ, `.` empty. Connectors are `>` `<` `v` `^`.

use crate::clocked::Clocked;
use crate::gate_level::{GateKind, GateLevelLayout};
use crate::tile::{Tile, Topology};
use fcn_network::GateType;
use std::io;

/// Rendering switches
#[derive(Debug, Clone, Default)]
pub struct PrintOptions {
    /// Append a grid of clock numbers
    pub clock_numbers: bool,
}

fn symbol(lyt: &GateLevelLayout, x: u32, y: u32) -> char {
    let ground = Tile::new(x, y, 0);
    let crossing = Tile::new(x, y, 1);
    if lyt.z() > 0 && lyt.is_wire_tile(&crossing) {
        return '+';
    }
    match lyt.node_kind(&ground) {
        None => '.',
        Some(GateKind::Pi) => 'I',
        Some(GateKind::Po) => 'O',
        Some(GateKind::Logic(gate)) => match gate {
            GateType::Buf if lyt.is_fanout_tile(&ground) => 'F',
            GateType::Buf => '*',
            GateType::Not => '!',
            GateType::And => '&',
            GateType::Nand => 'D',
            GateType::Or => '|',
            GateType::Nor => 'R',
            GateType::Xor => 'X',
            GateType::Xnor => '=',
            GateType::Maj => 'M',
        },
    }
}

/// Signal flows from `(x1, y1)` into `(x2, y2)` on any pair of layers
fn flows(lyt: &GateLevelLayout, x1: u32, y1: u32, x2: u32, y2: u32) -> bool {
    (0..=lyt.z()).any(|z1| {
        (0..=lyt.z()).any(|z2| lyt.is_outgoing_signal(&Tile::new(x1, y1, z1), &Tile::new(x2, y2, z2)))
    })
}

/// Render `lyt` into a string
pub fn render_gate_level_layout(lyt: &GateLevelLayout, options: &PrintOptions) -> String {
    let mut out = String::new();
    for y in 0..=lyt.y() {
        let mut tiles = String::new();
        let mut below = String::new();
        for x in 0..=lyt.x() {
            tiles.push(symbol(lyt, x, y));
            if x < lyt.x() {
                tiles.push(if flows(lyt, x, y, x + 1, y) {
                    '>'
                } else if flows(lyt, x + 1, y, x, y) {
                    '<'
                } else {
                    ' '
                });
            }
            if y < lyt.y() {
                below.push(if flows(lyt, x, y, x, y + 1) {
                    'v'
                } else if flows(lyt, x, y + 1, x, y) {
                    '^'
                } else {
                    ' '
                });
                if x < lyt.x() {
                    below.push(' ');
                }
            }
        }
        out.push_str(tiles.trim_end());
        out.push('\n');
        if y < lyt.y() {
            out.push_str(below.trim_end());
            out.push('\n');
        }
    }

    if options.clock_numbers {
        out.push('\n');
        for y in 0..=lyt.y() {
            let row: Vec<String> = (0..=lyt.x())
                .map(|x| lyt.get_clock_number(&Tile::new(x, y, 0)).to_string())
                .collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
    }

    out
}

/// Write the rendering of `lyt` to `writer`
pub fn print_gate_level_layout<W: io::Write>(
    writer: &mut W,
    lyt: &GateLevelLayout,
    options: &PrintOptions,
) -> io::Result<()> {
    writer.write_all(render_gate_level_layout(lyt, options).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_inverter() {
        let mut lyt = GateLevelLayout::new(Tile::new(2, 1, 0), "inv");
        let a = lyt.create_pi("a", Tile::new(0, 0, 0));
        let n = lyt.create_not(a, Tile::new(1, 0, 0));
        lyt.create_po(n, "f", Tile::new(2, 0, 0));

        assert_eq!(lyt.to_string(), "I>!>O\n\n. . .\n");
    }

    #[test]
    fn test_render_vertical_flow_and_clocks() {
        let mut lyt = GateLevelLayout::new(Tile::new(1, 1, 0), "v");
        let a = lyt.create_pi("a", Tile::new(0, 0, 0));
        let w = lyt.create_buf(a, Tile::new(0, 1, 0));
        lyt.create_po(w, "f", Tile::new(1, 1, 0));

        let options = PrintOptions { clock_numbers: true };
        let rendered = render_gate_level_layout(&lyt, &options);
        assert_eq!(rendered, "I .\nv\n*>O\n\n0 1\n1 2\n");

        let mut buffer = Vec::new();
        print_gate_level_layout(&mut buffer, &lyt, &options).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), rendered);
    }
}
