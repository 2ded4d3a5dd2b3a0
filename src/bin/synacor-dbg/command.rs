use std::borrow::Cow;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Command {
    Step(usize),
    Run,
    Regs,
    Examine(u16),
    Reset,
    Repeat,
    Exit,
}

impl FromStr for Command {
    type Err = Cow<'static, str>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut iter = s.split_whitespace();
        match iter.next() {
            Some("step") | Some("s") => {
                let count = match iter.next() {
                    Some(s) => s.parse::<usize>().map_err(|e| e.to_string())?,
                    None => 1,
                };
                Ok(Command::Step(count))
            }
            Some("run") | Some("r") => Ok(Command::Run),
            Some("regs") => Ok(Command::Regs),
            Some("examine") | Some("x") => {
                let addr = iter.next().ok_or("missing address")?;
                let addr = if let Some(hex) = addr.strip_prefix("0x") {
                    u16::from_str_radix(hex, 16).map_err(|e| e.to_string())?
                } else {
                    addr.parse::<u16>().map_err(|e| e.to_string())?
                };
                Ok(Command::Examine(addr))
            }
            Some("reset") => Ok(Command::Reset),
            Some("repeat") | None => Ok(Command::Repeat),
            Some("exit") | Some("quit") | Some("q") => Ok(Command::Exit),
            Some(command) => Err(format!("invalid command {:?}", command).into()),
        }
    }
}
