use clap::{Parser, Subcommand};
use formation_ocr_common::HeaderTokens;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formation-ocr")]
#[command(about = "ギルドバトル編成スクリーンショット → MMG形式JSON 変換ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（デフォルト: ~/.config/formation-ocr/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// スクリーンショットを編成情報JSONに変換
    Convert {
        /// スクリーンショット画像
        #[arg(required = true)]
        image: PathBuf,

        /// OCR済みテキストファイル（指定時は tesseract を使わない）
        #[arg(long)]
        text: Option<PathBuf>,

        /// キャラクターアイコン画像フォルダ
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// キャラクター画像マッチングを行わない
        #[arg(long)]
        no_matching: bool,

        /// Lv補正を行わない
        #[arg(long)]
        no_correction: bool,

        /// マッチング閾値（0.0-1.0）
        #[arg(short, long)]
        threshold: Option<f32>,

        /// マッチ箇所の確認用画像を出力
        #[arg(long)]
        annotate: bool,

        /// 見出し語 (ja/en)
        #[arg(long, value_parser = parse_headers)]
        headers: Option<HeaderTokens>,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 整形して出力
        #[arg(long)]
        pretty: bool,
    },

    /// OCR済みテキストのみを解析
    Parse {
        /// OCRテキストファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 見出し語 (ja/en)
        #[arg(long, value_parser = parse_headers)]
        headers: Option<HeaderTokens>,

        /// Lv補正を行わない
        #[arg(long)]
        no_correction: bool,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 整形して出力
        #[arg(long)]
        pretty: bool,
    },

    /// キャラクター画像マッチングのみ実行してスロット対応表を表示
    Match {
        /// スクリーンショット画像
        #[arg(required = true)]
        image: PathBuf,

        /// キャラクターアイコン画像フォルダ
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// マッチング閾値（0.0-1.0）
        #[arg(short, long)]
        threshold: Option<f32>,

        /// マッチ箇所の確認用画像を出力
        #[arg(long)]
        annotate: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// マッチング閾値を設定
        #[arg(long)]
        set_threshold: Option<f32>,

        /// 陣地名を追加
        #[arg(long)]
        add_base_name: Vec<String>,

        /// キャラクターアイコン画像フォルダを設定
        #[arg(long)]
        catalog_dir: Option<PathBuf>,
    },
}

/// `--headers` のプリセット名を見出しトークンに変換する
fn parse_headers(name: &str) -> Result<HeaderTokens, String> {
    HeaderTokens::from_preset(name)
        .ok_or_else(|| format!("Unknown headers: {}. Use ja or en", name))
}
