//! 主机端转发与标定文件的集成测试

use cubebot_protocol::{ChannelCount, ColorSample, ReferenceColorSet};
use cubebot_tools::{CalibrationStore, Message, StreamLink, relay};
use std::io::Cursor;

/// 一段典型的机器人程序输出：启动、普通打印、扫描结果、结束
fn hub_transcript(cubes: &[&str]) -> String {
    let mut lines = vec![
        Message::ProgramStatus {
            slot: 0,
            running: true,
        }
        .encode(),
        "Scanning face U".to_string(),
    ];
    for cube in cubes {
        lines.push(Message::CubeScanned(cube.to_string()).encode());
    }
    lines.push(
        Message::ProgramStatus {
            slot: 0,
            running: false,
        }
        .encode(),
    );
    lines.push(Message::CubeScanned("after-stop".to_string()).encode());
    lines.join("\n") + "\n"
}

#[test]
fn test_relay_over_byte_stream() {
    let input = hub_transcript(&["UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB", "bad"]);
    let mut link = StreamLink::new(Cursor::new(input.into_bytes()), Vec::new());

    let handled = relay(&mut link, |cube| {
        if cube.len() == 54 {
            Ok(String::new())
        } else {
            Err(format!("invalid cube string length {}", cube.len()))
        }
    })
    .unwrap();
    // 程序结束后的消息不再处理
    assert_eq!(handled, 2);

    let (_, output) = link.into_inner();
    let replies: Vec<Message> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| Message::decode(line).unwrap())
        .collect();
    assert_eq!(
        replies,
        vec![
            Message::SolveCube(String::new()),
            Message::RuntimeError("invalid cube string length 3".to_string()),
        ]
    );
}

#[test]
fn test_relay_stops_at_end_of_stream() {
    let input = Message::CubeScanned("x".to_string()).encode() + "\n";
    let mut link = StreamLink::new(Cursor::new(input.into_bytes()), Vec::new());
    assert_eq!(relay(&mut link, |_| Ok("R".to_string())).unwrap(), 1);
}

#[test]
fn test_calibration_shared_between_stores() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("cubecolors");
    let references = ReferenceColorSet::new([
        ColorSample::rgbi(900, 900, 880, 950),
        ColorSample::rgbi(610, 90, 80, 260),
        ColorSample::rgbi(80, 500, 120, 230),
        ColorSample::rgbi(820, 760, 120, 560),
        ColorSample::rgbi(760, 300, 90, 380),
        ColorSample::rgbi(60, 120, 540, 240),
    ])
    .unwrap();

    CalibrationStore::new(&path, ChannelCount::Rgbi)
        .save(&references)
        .unwrap();

    // 每条记录 4 个通道 × 4 字节
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 6 * 16);
    assert_eq!(
        CalibrationStore::new(&path, ChannelCount::Rgbi).load().unwrap(),
        references
    );

    // 按 RGB 读取同一文件：记录更短，但字节数足够，按新的布局解释
    let rgb = CalibrationStore::new(&path, ChannelCount::Rgb).load().unwrap();
    assert_eq!(rgb.channels(), ChannelCount::Rgb);
}
