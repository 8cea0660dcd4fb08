use std::io::Write;

use csv_core::ReadFieldResult;

/// Parses one CSV row into its fields, handling quoted fields.
pub(crate) fn parse_csv_row(row: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        let end = match result {
            ReadFieldResult::InputEmpty => true,
            ReadFieldResult::Field { .. } => false,
            ReadFieldResult::End => true,
            _ => unreachable!(),
        };
        fields.push(String::from_utf8_lossy(&output[..nout]).into_owned());
        if end {
            break;
        }
        bytes = &bytes[nin..];
    }
    fields
}

/// Writes one cell, quoting it if it contains separators.
pub(crate) fn quote_csv_cell<W>(mut wtr: W, mut data: &[u8]) -> std::io::Result<()>
where
    W: Write,
{
    let mut output = [0; 4096];
    let mut writer = csv_core::Writer::new();
    loop {
        let (result, nin, nout) = writer.field(data, &mut output);
        wtr.write_all(&output[..nout])?;
        if result == csv_core::WriteResult::InputEmpty {
            break;
        }
        data = &data[nin..];
    }
    let (result, nout) = writer.finish(&mut output);
    debug_assert_eq!(result, csv_core::WriteResult::InputEmpty);
    wtr.write_all(&output[..nout])?;
    Ok(())
}

/// Writes a full CSV row of cells.
pub(crate) fn write_csv_row<W, I, S>(mut wtr: W, cells: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (i, cell) in cells.into_iter().enumerate() {
        if i != 0 {
            wtr.write_all(b",")?;
        }
        quote_csv_cell(&mut wtr, cell.as_ref().as_bytes())?;
    }
    Ok(())
}
