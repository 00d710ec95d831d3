pub mod bilibili;
pub mod iqiyi;
pub mod mgtv;
pub mod tencent;
pub mod youku;
