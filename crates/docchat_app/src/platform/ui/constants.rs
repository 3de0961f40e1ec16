pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "txt"];
pub const PROGRESS_BAR_WIDTH: usize = 30;
pub const INPUT_POLL_MS: u64 = 20;
pub const HELP_TEXT: &str = "\
Commands:
  upload <path>   upload a PDF or TXT document (or just type the path)
  /suggest <n>    ask suggested question n
  /sources <id>   show or hide the sources of message <id>
  /reset          start over after a failed upload
  /back           leave the chat and upload another document
  /help           show this help
  /quit           exit";
