use clap::{Parser, Subcommand};
use selfie_ai_common::AnalysisMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "selfie-ai")]
#[command(about = "セルフィー画像の髪・肌特徴AI解析ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// セルフィー画像を解析してJSONを出力
    Analyze {
        /// 画像ファイル（JPEG/PNG/WebP/GIF/AVIF、またはData URLを書いたテキスト）
        #[arg(required = true)]
        image: PathBuf,

        /// 解析モード (comprehensive/hair/skin/quick/custom)
        #[arg(short, long, default_value = "comprehensive")]
        mode: AnalysisMode,

        /// カスタムプロンプト（指定時はモードより優先）
        #[arg(short, long)]
        prompt: Option<String>,

        /// MIMEタイプを指定（省略時はファイル内容から判定）
        #[arg(long)]
        mime: Option<String>,

        /// アップロードせずData URLとして送信
        #[arg(long)]
        inline: bool,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 同じ画像を繰り返し解析（キャッシュ確認用）
        #[arg(long, default_value = "1")]
        repeat: usize,

        /// キャッシュを使用（同じ画像の再解析をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
