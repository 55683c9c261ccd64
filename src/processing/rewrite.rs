use csv::{ReaderBuilder, Terminator, WriterBuilder};

use super::sniffer::sniff_delimiter;
use super::CsvRewriteError;

/// Re-serialize `content` with `output_delimiter`.
///
/// The header row and every data row are kept in order with their cell text
/// untouched. Rows shorter than the header are padded with empty cells; longer
/// rows are rejected. Output uses `\n` terminators and quotes only where needed.
pub fn rewrite_csv(content: &str, output_delimiter: u8) -> Result<Vec<u8>, CsvRewriteError> {
    let input_delimiter = sniff_delimiter(content);
    tracing::debug!(
        "Rewriting CSV from {:?} to {:?}",
        input_delimiter as char,
        output_delimiter as char
    );

    let mut reader = ReaderBuilder::new()
        .delimiter(input_delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(CsvRewriteError::Empty);
    }

    let mut writer = WriterBuilder::new()
        .delimiter(output_delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::with_capacity(content.len()));

    writer.write_record(&headers)?;

    for result in reader.records() {
        let record = result?;
        if record.len() > headers.len() {
            return Err(CsvRewriteError::TooManyFields {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: headers.len(),
                found: record.len(),
            });
        }

        let padding = headers.len() - record.len();
        writer.write_record(record.iter().chain(std::iter::repeat("").take(padding)))?;
    }

    writer.into_inner().map_err(|e| CsvRewriteError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(content: &str, delimiter: u8) -> String {
        String::from_utf8(rewrite_csv(content, delimiter).unwrap()).unwrap()
    }

    #[test]
    fn header_only_file_gets_new_delimiter() {
        assert_eq!(rewrite("col_1,col_2,col_3,col_4", b';'), "col_1;col_2;col_3;col_4\n");
        assert_eq!(rewrite("col_1,col_2,col_3,col_4", b'\t'), "col_1\tcol_2\tcol_3\tcol_4\n");
    }

    #[test]
    fn keeps_rows_in_order() {
        let input = "name;governmentId;email;debtAmount;debtDueDate;debtId\r\n\
                     John Doe;11111111111;johndoe@kanastra.com.br;1000000.00;2022-10-12;8291\r\n\
                     Jane Roe;22222222222;janeroe@kanastra.com.br;15.50;2022-11-01;8292\r\n";

        assert_eq!(
            rewrite(input, b','),
            "name,governmentId,email,debtAmount,debtDueDate,debtId\n\
             John Doe,11111111111,johndoe@kanastra.com.br,1000000.00,2022-10-12,8291\n\
             Jane Roe,22222222222,janeroe@kanastra.com.br,15.50,2022-11-01,8292\n"
        );
    }

    #[test]
    fn quotes_cells_containing_the_new_delimiter() {
        let input = "name,note\n\"Doe; John\",\"said \"\"hi\"\"\"\n";
        assert_eq!(rewrite(input, b';'), "name;note\n\"Doe; John\";\"said \"\"hi\"\"\"\n");
    }

    #[test]
    fn pads_short_rows_and_rejects_long_ones() {
        assert_eq!(rewrite("a,b,c\n1,2\n", b';'), "a;b;c\n1;2;\n");

        let err = rewrite_csv("a,b\n1,2\n1,2,3,4\n", b';').unwrap_err();
        assert!(matches!(err, CsvRewriteError::TooManyFields { expected: 2, found: 4, .. }));
    }

    #[test]
    fn mostly_single_cell_rows_keep_header_delimiter() {
        assert_eq!(rewrite("id;note\n1\n2\n3;x\n", b'\t'), "id\tnote\n1\t\n2\t\n3\tx\n");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(rewrite_csv("", b';'), Err(CsvRewriteError::Empty)));
    }
}
