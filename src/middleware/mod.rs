/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: 全ルート共通の transport 系, cors: ブラウザ向けポリシー, auth: Bearer JWT ゲート
 */
pub mod auth;
pub mod cors;
pub mod http;
