//! Lenient parsing and writing of the plain-text map format.
//!
//! A map file carries a free-text title line, four `Key = Value` metadata
//! lines (`MaxSteps`, `NumShells`, `Rows`, `Cols`, in any order, with `;`
//! comments and blank lines skipped), and then `Rows` lines of board
//! symbols. Recoverable defects such as short rows, excess rows or columns,
//! and unknown symbols are repaired and reported as warnings; only missing
//! or nonsensical metadata is fatal.

use thiserror::Error;

use tank_clash_core::{
    symbols, BoardConfig, BoardSetup, GridDims, InitialObject, PlayerId, Position,
};

/// Consecutive both-players-dry rounds after which a match is called a tie.
/// The map format does not carry this knob.
pub(crate) const DEFAULT_STALEMATE_ROUNDS: u32 = 40;

/// Fatal map-format failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MapError {
    /// A required metadata key never appeared or did not parse.
    #[error("missing or invalid `{0}` metadata")]
    MissingMetadata(&'static str),
    /// The declared grid has a zero dimension.
    #[error("map must declare at least a 1x1 grid")]
    DegenerateGrid,
}

/// A parsed map plus every repair the parser had to make.
#[derive(Debug)]
pub(crate) struct ParsedMap {
    pub(crate) title: String,
    pub(crate) setup: BoardSetup,
    pub(crate) warnings: Vec<String>,
}

/// Parses the complete text of a map file.
pub(crate) fn parse(content: &str) -> Result<ParsedMap, MapError> {
    let mut lines = content.lines();
    let title = lines.next().unwrap_or_default().trim().to_string();

    let mut max_steps: Option<u32> = None;
    let mut num_shells: Option<u16> = None;
    let mut rows: Option<u32> = None;
    let mut cols: Option<u32> = None;

    let mut grid_lines: Vec<&str> = Vec::new();
    for line in lines {
        let trimmed = line.trim_start();
        if grid_lines.is_empty() {
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }
            if try_metadata(trimmed, "MaxSteps", &mut max_steps)
                || try_metadata(trimmed, "NumShells", &mut num_shells)
                || try_metadata(trimmed, "Rows", &mut rows)
                || try_metadata(trimmed, "Cols", &mut cols)
            {
                continue;
            }
        }
        // First line that is not metadata starts the grid; from here on
        // every line is board content, blanks included.
        grid_lines.push(line);
    }

    let max_steps = max_steps
        .filter(|&value| value > 0)
        .ok_or(MapError::MissingMetadata("MaxSteps"))?;
    let num_shells = num_shells.ok_or(MapError::MissingMetadata("NumShells"))?;
    let rows = rows.ok_or(MapError::MissingMetadata("Rows"))?;
    let cols = cols.ok_or(MapError::MissingMetadata("Cols"))?;
    if rows == 0 || cols == 0 {
        return Err(MapError::DegenerateGrid);
    }

    let mut warnings = Vec::new();
    let mut objects = Vec::new();
    for row in 0..rows {
        let Some(line) = grid_lines.get(row as usize) else {
            warnings.push(format!("Row {row} is missing. Filling with empty cells."));
            continue;
        };
        let cells: Vec<char> = line.chars().collect();
        if cells.len() > cols as usize {
            warnings.push(format!(
                "{} excess columns in row {row}. Ignoring them.",
                cells.len() - cols as usize,
            ));
        }
        for col in 0..cols {
            let symbol = cells.get(col as usize).copied().unwrap_or(symbols::EMPTY);
            let pos = Position::new(row, col);
            match symbol {
                symbols::EMPTY => {}
                symbols::WALL => objects.push((pos, InitialObject::Wall)),
                symbols::MINE => objects.push((pos, InitialObject::Mine)),
                other => {
                    if let Some(player) = PlayerId::from_symbol(other) {
                        objects.push((pos, InitialObject::Tank { player }));
                    } else {
                        warnings.push(format!(
                            "Unknown symbol '{other}' at ({row},{col}). Treating as empty space.",
                        ));
                    }
                }
            }
        }
    }
    if grid_lines.len() > rows as usize {
        warnings.push(format!(
            "{} excess rows found. Ignoring them.",
            grid_lines.len() - rows as usize,
        ));
    }

    Ok(ParsedMap {
        title,
        setup: BoardSetup {
            config: BoardConfig {
                dims: GridDims::new(rows, cols),
                max_rounds: max_steps,
                shells_per_tank: num_shells,
                stalemate_rounds: DEFAULT_STALEMATE_ROUNDS,
            },
            objects,
        },
        warnings,
    })
}

fn try_metadata<T: std::str::FromStr>(line: &str, key: &str, slot: &mut Option<T>) -> bool {
    if !line.starts_with(key) {
        return false;
    }
    let Some((_, value)) = line.split_once('=') else {
        return false;
    };
    if let Ok(parsed) = value.trim().parse::<T>() {
        *slot = Some(parsed);
    }
    // A matching key with an unparsable value is still consumed as
    // metadata; the missing slot surfaces as a fatal error afterwards.
    true
}

/// Renders a setup back into the map format, for the generator.
pub(crate) fn render(title: &str, setup: &BoardSetup) -> String {
    let dims = setup.config.dims;
    let mut grid =
        vec![vec![symbols::EMPTY; dims.cols() as usize]; dims.rows() as usize];
    for &(pos, object) in &setup.objects {
        let symbol = match object {
            InitialObject::Wall => symbols::WALL,
            InitialObject::Mine => symbols::MINE,
            InitialObject::Tank { player } => player.symbol(),
        };
        grid[pos.row() as usize][pos.col() as usize] = symbol;
    }

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&format!("MaxSteps = {}\n", setup.config.max_rounds));
    out.push_str(&format!("NumShells = {}\n", setup.config.shells_per_tank));
    out.push_str(&format!("Rows = {}\n", dims.rows()));
    out.push_str(&format!("Cols = {}\n", dims.cols()));
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
tiny duel
MaxSteps = 80
NumShells = 6
Rows = 3
Cols = 5
1   2
  #
 @
";

    #[test]
    fn parses_a_well_formed_map() {
        let parsed = parse(WELL_FORMED).expect("map parses");
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.title, "tiny duel");
        assert_eq!(parsed.setup.config.max_rounds, 80);
        assert_eq!(parsed.setup.config.shells_per_tank, 6);
        assert_eq!(parsed.setup.config.dims, GridDims::new(3, 5));
        assert_eq!(parsed.setup.objects.len(), 4);
        assert_eq!(
            parsed.setup.objects[0],
            (
                Position::new(0, 0),
                InitialObject::Tank {
                    player: PlayerId::One,
                },
            ),
        );
        assert_eq!(
            parsed.setup.objects[2],
            (Position::new(1, 2), InitialObject::Wall),
        );
    }

    #[test]
    fn metadata_order_and_comments_are_flexible() {
        let content = "\
reordered
; a comment
Cols = 2
Rows = 1
NumShells = 3
MaxSteps = 10
12
";
        let parsed = parse(content).expect("map parses");
        assert_eq!(parsed.setup.config.dims, GridDims::new(1, 2));
        assert_eq!(parsed.setup.objects.len(), 2);
    }

    #[test]
    fn short_and_missing_rows_are_repaired_with_warnings() {
        let content = "\
ragged
MaxSteps = 10
NumShells = 1
Rows = 3
Cols = 4
1
2
";
        let parsed = parse(content).expect("map parses");
        assert_eq!(parsed.setup.objects.len(), 2);
        assert!(parsed
            .warnings
            .iter()
            .any(|warning| warning.contains("Row 2 is missing")));
    }

    #[test]
    fn unknown_symbols_become_empty_cells_with_warnings() {
        let content = "\
typo
MaxSteps = 10
NumShells = 1
Rows = 1
Cols = 3
1x2
";
        let parsed = parse(content).expect("map parses");
        assert_eq!(parsed.setup.objects.len(), 2);
        assert!(parsed
            .warnings
            .iter()
            .any(|warning| warning.contains("Unknown symbol 'x'")));
    }

    #[test]
    fn excess_rows_and_columns_are_ignored_with_warnings() {
        let content = "\
overflow
MaxSteps = 10
NumShells = 1
Rows = 1
Cols = 2
1 2
#
";
        let parsed = parse(content).expect("map parses");
        assert_eq!(parsed.setup.objects.len(), 1);
        assert!(parsed
            .warnings
            .iter()
            .any(|warning| warning.contains("excess columns")));
        assert!(parsed
            .warnings
            .iter()
            .any(|warning| warning.contains("excess rows")));
    }

    #[test]
    fn missing_metadata_is_fatal() {
        let content = "\
broken
MaxSteps = 10
Rows = 2
Cols = 2
";
        assert_eq!(
            parse(content).unwrap_err(),
            MapError::MissingMetadata("NumShells"),
        );
    }

    #[test]
    fn zero_dimensions_are_fatal() {
        let content = "\
degenerate
MaxSteps = 10
NumShells = 1
Rows = 0
Cols = 5
";
        assert_eq!(parse(content).unwrap_err(), MapError::DegenerateGrid);
    }

    #[test]
    fn render_and_parse_round_trip() {
        let parsed = parse(WELL_FORMED).expect("map parses");
        let rendered = render(&parsed.title, &parsed.setup);
        let reparsed = parse(&rendered).expect("rendered map parses");
        assert_eq!(reparsed.setup, parsed.setup);
        assert!(reparsed.warnings.is_empty());
    }
}
