use tracing::debug;

use super::types::{ParsedOutput, ServiceState};

/// Parser for the Nagios plugin output convention.
///
/// Total over all inputs: any exit code and any text (including binary
/// garbage decoded lossily) produce a value. The first non-empty line is the
/// headline; a `|` splits text from performance data; later lines accumulate
/// either long text or further performance-data fragments.
pub struct NagiosParser;

impl NagiosParser {
    pub fn parse(id: &str, exit_code: i32, output: &str) -> ParsedOutput {
        // Each line keeps its pre-trim leading-whitespace signal: the
        // performance-data continuation heuristic below is defined on the
        // original line, not the trimmed one.
        let lines: Vec<(&str, bool)> = output
            .lines()
            .map(|raw| (raw.trim(), raw.starts_with([' ', '\t'])))
            .filter(|(trimmed, _)| !trimmed.is_empty())
            .collect();

        let mut service_output = String::new();
        let mut long_text_lines: Vec<&str> = Vec::new();
        let mut perf_parts: Vec<&str> = Vec::new();
        let mut in_performance_data = false;

        if let Some((&(headline, _), rest)) = lines.split_first() {
            let (text, perf) = split_pipe(headline);
            service_output = text.to_string();
            if !perf.is_empty() {
                perf_parts.push(perf);
                in_performance_data = true;
            }

            for &(line, leading_whitespace) in rest {
                if line.contains('|') {
                    let (text_part, perf_part) = split_pipe(line);
                    if !text_part.is_empty() {
                        long_text_lines.push(text_part);
                    }
                    perf_parts.push(perf_part);
                    in_performance_data = true;
                } else if in_performance_data && !leading_whitespace {
                    perf_parts.push(line);
                } else {
                    long_text_lines.push(line);
                    in_performance_data = false;
                }
            }
        }

        let parsed = ParsedOutput {
            service_state: ServiceState::from_exit_code(exit_code),
            exit_code,
            service_output,
            long_service_output: long_text_lines.join("\n"),
            service_performance_data: perf_parts
                .iter()
                .filter(|part| !part.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" "),
        };
        debug!(id, exit_code, service_output = %parsed.service_output, "parsed plugin output");
        parsed
    }
}

/// Split a line on the first `|`, trimming both halves. Lines without a `|`
/// come back whole, with an empty performance part.
fn split_pipe(line: &str) -> (&str, &str) {
    match line.split_once('|') {
        Some((text, perf)) => (text.trim(), perf.trim()),
        None => (line, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(exit_code: i32, output: &str) -> ParsedOutput {
        NagiosParser::parse("test-check", exit_code, output)
    }

    #[test]
    fn maps_exit_codes_to_states() {
        for (exit_code, state) in [
            (0, ServiceState::Ok),
            (1, ServiceState::Warning),
            (2, ServiceState::Critical),
            (3, ServiceState::Unknown),
            (99, ServiceState::Unknown),
            (-1, ServiceState::Unknown),
        ] {
            let parsed = parse(exit_code, "Test output");
            assert_eq!(parsed.service_state, state);
            assert_eq!(parsed.exit_code, exit_code);
        }
    }

    #[test]
    fn empty_output_keeps_exit_code_map() {
        // Empty input does not force UNKNOWN; the state still follows the
        // exit-code map.
        let parsed = parse(0, "");
        assert_eq!(parsed.service_state, ServiceState::Ok);
        assert_eq!(parsed.exit_code, 0);
        assert_eq!(parsed.service_output, "");
        assert_eq!(parsed.long_service_output, "");
        assert_eq!(parsed.service_performance_data, "");

        let parsed = parse(2, "\n   \n\t\n");
        assert_eq!(parsed.service_state, ServiceState::Critical);
        assert_eq!(parsed.service_output, "");
    }

    #[test]
    fn simple_output_has_no_perf_data() {
        let parsed = parse(0, "Everything is fine");
        assert_eq!(parsed.service_output, "Everything is fine");
        assert_eq!(parsed.long_service_output, "");
        assert_eq!(parsed.service_performance_data, "");
    }

    #[test]
    fn splits_headline_performance_data() {
        let parsed = parse(0, "DISK OK - free space: 42% | /=42%;80;90");
        assert_eq!(parsed.service_output, "DISK OK - free space: 42%");
        assert_eq!(parsed.service_performance_data, "/=42%;80;90");
    }

    #[test]
    fn splits_on_first_pipe_only() {
        let parsed = parse(0, "A | B | C");
        assert_eq!(parsed.service_output, "A");
        assert_eq!(parsed.service_performance_data, "B | C");
    }

    #[test]
    fn multiline_long_output() {
        let parsed = parse(1, "DISK WARNING - free space: 10%\n/: 90% used\n/home: 5% used");
        assert_eq!(parsed.service_output, "DISK WARNING - free space: 10%");
        assert_eq!(parsed.long_service_output, "/: 90% used\n/home: 5% used");
        assert_eq!(parsed.service_performance_data, "");
    }

    #[test]
    fn accumulates_performance_data_across_lines() {
        let output = "DISK CRITICAL - free space: 95%\n\
                      /: 95% used | /=95%;80;90\n\
                      /home: 80% used | /home=80%;85;95\n\
                      Additional performance data | metric1=42;50;75 metric2=30;50;75";
        let parsed = parse(2, output);
        assert_eq!(parsed.service_output, "DISK CRITICAL - free space: 95%");
        assert_eq!(
            parsed.long_service_output,
            "/: 95% used\n/home: 80% used\nAdditional performance data"
        );
        assert_eq!(
            parsed.service_performance_data,
            "/=95%;80;90 /home=80%;85;95 metric1=42;50;75 metric2=30;50;75"
        );
    }

    #[test]
    fn trims_line_whitespace() {
        let parsed = parse(0, "  DISK OK - free space: 42%  |  /=42%;80;90  \n  /: 42% used  ");
        assert_eq!(parsed.service_output, "DISK OK - free space: 42%");
        assert_eq!(parsed.service_performance_data, "/=42%;80;90");
        assert_eq!(parsed.long_service_output, "/: 42% used");
    }

    #[test]
    fn bare_line_after_perf_block_continues_perf_data() {
        let parsed = parse(0, "OK | a=1\nb=2 c=3");
        assert_eq!(parsed.service_output, "OK");
        assert_eq!(parsed.long_service_output, "");
        assert_eq!(parsed.service_performance_data, "a=1 b=2 c=3");
    }

    #[test]
    fn indented_line_after_perf_block_is_long_text() {
        // The continuation heuristic looks at the original leading
        // whitespace, so an indented line ends the performance block.
        let parsed = parse(0, "OK | a=1\n  still text\nb=2");
        assert_eq!(parsed.long_service_output, "still text\nb=2");
        assert_eq!(parsed.service_performance_data, "a=1");
    }

    #[test]
    fn empty_text_part_contributes_nothing_to_long_text() {
        let parsed = parse(0, "OK\n| a=1\n  more text");
        assert_eq!(parsed.service_output, "OK");
        assert_eq!(parsed.long_service_output, "more text");
        assert_eq!(parsed.service_performance_data, "a=1");
    }

    #[test]
    fn empty_perf_fragments_are_skipped_when_joining() {
        let parsed = parse(0, "OK | a=1\ntext |\nother | b=2");
        assert_eq!(parsed.long_service_output, "text\nother");
        assert_eq!(parsed.service_performance_data, "a=1 b=2");
    }

    #[test]
    fn headline_without_perf_data_keeps_block_closed() {
        // No perf data yet, so a bare second line is long text.
        let parsed = parse(0, "OK\nplain line");
        assert_eq!(parsed.long_service_output, "plain line");
        assert_eq!(parsed.service_performance_data, "");
    }

    #[test]
    fn total_over_garbage_input() {
        let parsed = parse(7, "\u{0}\u{fffd}ga|rbage\n\t\u{1b}[0m|x=1\n|||");
        assert_eq!(parsed.service_state, ServiceState::Unknown);
        assert_eq!(parsed.service_output, "\u{0}\u{fffd}ga");
        assert!(parsed.service_performance_data.contains("rbage"));
    }
}
