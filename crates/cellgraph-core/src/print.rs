//! Tab-separated dumps of the printable area, one line per row.

use std::io::{self, Write};

use crate::position::Position;
use crate::sheet::Sheet;

impl Sheet {
    /// Write every computed value of the printable area
    pub fn print_values<W: Write>(&self, output: &mut W) -> io::Result<()> {
        self.print_with(output, |sheet, pos| {
            sheet
                .get_cell(pos)
                .ok()
                .flatten()
                .map(|cell| cell.value().to_string())
        })
    }

    /// Write every cell text of the printable area
    pub fn print_texts<W: Write>(&self, output: &mut W) -> io::Result<()> {
        self.print_with(output, |sheet, pos| sheet.cell(pos).map(|cell| cell.text()))
    }

    fn print_with<W, F>(&self, output: &mut W, render: F) -> io::Result<()>
    where
        W: Write,
        F: Fn(&Sheet, Position) -> Option<String>,
    {
        let size = self.printable_size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    output.write_all(b"\t")?;
                }
                if let Some(text) = render(self, Position::new(row, col)) {
                    output.write_all(text.as_bytes())?;
                }
            }
            output.write_all(b"\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::position::Position;
    use crate::sheet::Sheet;
    use crate::testing::SumParser;

    fn render(sheet: &Sheet, values: bool) -> String {
        let mut out = Vec::new();
        if values {
            sheet.print_values(&mut out).unwrap();
        } else {
            sheet.print_texts(&mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_sheet_prints_nothing() {
        let sheet = Sheet::new(SumParser);
        assert_eq!(render(&sheet, true), "");
        assert_eq!(render(&sheet, false), "");
    }

    #[test]
    fn test_print_values_and_texts() {
        let mut sheet = Sheet::new(SumParser);
        sheet.set_cell(Position::from_a1("A1"), "2").unwrap();
        sheet.set_cell(Position::from_a1("B1"), "=A1+0.5").unwrap();
        sheet.set_cell(Position::from_a1("A2"), "'=text").unwrap();
        sheet.set_cell(Position::from_a1("C2"), "=XFE1").unwrap();

        assert_eq!(render(&sheet, true), "2\t2.5\t\n=text\t\t#REF!\n");
        assert_eq!(render(&sheet, false), "2\t=A1+0.5\t\n'=text\t\t=#REF!\n");
    }
}
