/// Strip the shell's echo of `command` and everything from `prompt` onward.
///
/// Only the first echo is removed, `"<cmd>\r\n"` preferred over `"<cmd>\n"`.
/// The remainder is cut at the first occurrence of `prompt` and trimmed.
pub fn clean_output(raw: &str, command: &str, prompt: &str) -> String {
    let crlf_echo = format!("{command}\r\n");
    let lf_echo = format!("{command}\n");

    let mut output = raw.to_string();
    if let Some(at) = output.find(&crlf_echo) {
        output.replace_range(at..at + crlf_echo.len(), "");
    } else if let Some(at) = output.find(&lf_echo) {
        output.replace_range(at..at + lf_echo.len(), "");
    }

    if !prompt.is_empty() {
        if let Some(at) = output.find(prompt) {
            output.truncate(at);
        }
    }

    output.trim().to_string()
}
