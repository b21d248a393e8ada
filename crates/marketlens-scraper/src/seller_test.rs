use async_trait::async_trait;

use super::*;
use crate::error::ScraperError;
use crate::session::ClickTarget;

const PDP: &str = r#"<html><body>
<div data-testid="llbPDPFooterShopName">
  <a href="/tokokopi"><h2>Toko Kopi Gayo</h2></a>
  <div data-testid="pdpShopBadgeOS"></div>
  <img src="https://images.tokopedia.net/badge/power_merchant_pro.png" alt="">
</div>
<div data-unify="grid" class="css-x grid-row">
  <img src="https://assets.tokopedia.net/icon/action-star.svg">
  <p><span>4.9</span> <span>(6 rb)</span></p>
</div>
<div data-unify="grid" class="css-y grid-row">
  <img src="https://assets.tokopedia.net/icon/general-clock.svg">
  <p><span>± 55 menit</span> <span>pesanan diproses</span></p>
</div>
</body></html>"#;

const SHOP_PAGE: &str = r#"<html><body>
<div>Performa chat 98%</div>
<div>95% pesanan dikirim tepat waktu</div>
<div>Tingkat pembatalan 2%</div>
<div>Buka sejak Mar 2019</div>
<span data-testid="shopLocation">Jakarta Barat</span>
</body></html>"#;

fn product_url() -> Url {
    Url::parse("https://www.tokopedia.com/tokokopi/kopi-arabika").unwrap()
}

fn allowed() -> Vec<String> {
    vec!["tokopedia.com".to_string()]
}

#[test]
fn reads_seller_block_and_credibility_rows() {
    let signals = SellerExtractor::new().extract_pdp(PDP);
    assert_eq!(signals.seller_name.as_deref(), Some("Toko Kopi Gayo"));
    assert!(signals.badges.contains(&Badge::OfficialStore));
    assert!(signals.badges.contains(&Badge::PowerMerchantPro));
    assert_eq!(signals.top_badge(), Some(Badge::OfficialStore));
    assert_eq!(signals.store_rating, Some(4.9));
    assert_eq!(signals.review_volume, Some(6_000));
    assert_eq!(signals.processing_time.as_deref(), Some("± 55 menit"));
    assert!(signals.notes.is_empty(), "notes: {:?}", signals.notes);
}

#[test]
fn regular_power_merchant_badge() {
    let html = r#"<div data-testid="llbPDPFooterShopName"><h2>Toko</h2>
        <img src="https://images.tokopedia.net/badge/power_merchant.png" alt="Power Merchant"></div>"#;
    let signals = SellerExtractor::new().extract_pdp(html);
    assert_eq!(signals.badges.iter().copied().collect::<Vec<_>>(), vec![Badge::PowerMerchant]);
}

#[test]
fn falls_back_to_page_text_patterns() {
    let html = "<div>Toko Kopi</div><p>4.8 (1,2 rb) rating toko</p><p>Dikemas dalam ± 2 jam</p>";
    let signals = SellerExtractor::new().extract_pdp(html);
    assert_eq!(signals.store_rating, Some(4.8));
    assert_eq!(signals.review_volume, Some(1_200));
    assert_eq!(signals.processing_time.as_deref(), Some("± 2 jam"));
    assert!(signals.notes.is_empty());
}

#[test]
fn empty_page_records_a_note_instead_of_failing() {
    let signals = SellerExtractor::new().extract_pdp("<html><body></body></html>");
    assert_eq!(signals.store_rating, None);
    assert!(signals.badges.is_empty());
    assert_eq!(signals.notes, vec![NOTE_PDP_METRICS_MISSING.to_string()]);
}

#[test]
fn shop_url_resolves_relative_footer_link() {
    let url = SellerExtractor::new().shop_url(PDP, &product_url(), &allowed());
    assert_eq!(url.unwrap().as_str(), "https://www.tokopedia.com/tokokopi");
}

#[test]
fn shop_url_rejects_off_site_links() {
    let html = r#"<a href="https://shop.example.com/shop/tokokopi">Toko</a>"#;
    assert!(SellerExtractor::new().shop_url(html, &product_url(), &allowed()).is_none());
}

#[test]
fn shop_page_metrics_are_merged() {
    let mut signals = SellerSignals::default();
    let found = SellerExtractor::new().apply_shop_page(SHOP_PAGE, &mut signals);
    assert!(found);
    assert_eq!(signals.chat_performance, Some(98.0));
    assert_eq!(signals.on_time_shipping, Some(95.0));
    assert_eq!(signals.cancellation_rate, Some(2.0));
    assert_eq!(signals.join_date.as_deref(), Some("Mar 2019"));
    assert_eq!(signals.location.as_deref(), Some("Jakarta Barat"));
}

#[test]
fn shop_page_without_metrics_reports_nothing_found() {
    let mut signals = SellerSignals::default();
    assert!(!SellerExtractor::new().apply_shop_page("<p>Produk unggulan</p>", &mut signals));
}

/// Serves one fixed shop page, or fails navigation when `html` is `None`.
struct ShopSession {
    html: Option<String>,
}

#[async_trait]
impl PageSession for ShopSession {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        match self.html {
            Some(_) => Ok(()),
            None => Err(ScraperError::Session(format!("net::ERR_CONNECTION_RESET at {url}"))),
        }
    }

    async fn wait_for_selector(&self, _selector: &str, _timeout: Duration) -> Result<bool, ScraperError> {
        Ok(true)
    }

    async fn html(&self) -> Result<String, ScraperError> {
        Ok(self.html.clone().unwrap_or_default())
    }

    async fn scroll_to_bottom(&self) -> Result<(), ScraperError> {
        Ok(())
    }

    async fn click(&self, _target: &ClickTarget) -> Result<bool, ScraperError> {
        Ok(false)
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        Ok(())
    }
}

fn options() -> SellerOptions {
    SellerOptions {
        page_timeout: Duration::from_millis(10),
        settle: Duration::from_millis(1),
        allowed_domains: allowed(),
    }
}

#[tokio::test]
async fn seller_signals_combine_product_and_shop_pages() {
    let session = ShopSession {
        html: Some(SHOP_PAGE.to_string()),
    };
    let signals =
        extract_seller_signals(&session, &SellerExtractor::new(), PDP, &product_url(), &options()).await;
    assert_eq!(signals.store_rating, Some(4.9));
    assert_eq!(signals.chat_performance, Some(98.0));
    assert!(signals.notes.is_empty(), "notes: {:?}", signals.notes);
}

#[tokio::test]
async fn unreachable_shop_page_becomes_a_note() {
    let session = ShopSession { html: None };
    let signals =
        extract_seller_signals(&session, &SellerExtractor::new(), PDP, &product_url(), &options()).await;
    assert_eq!(signals.seller_name.as_deref(), Some("Toko Kopi Gayo"));
    assert_eq!(signals.chat_performance, None);
    assert_eq!(signals.notes, vec![NOTE_SHOP_PAGE_UNAVAILABLE.to_string()]);
}

#[tokio::test]
async fn missing_shop_link_becomes_a_note() {
    let session = ShopSession { html: None };
    let html = r#"<div data-testid="llbPDPFooterShopName"><h2>Toko</h2></div><p>4.5 (120)</p>"#;
    let signals =
        extract_seller_signals(&session, &SellerExtractor::new(), html, &product_url(), &options()).await;
    assert_eq!(signals.review_volume, Some(120));
    assert_eq!(signals.notes, vec![NOTE_SHOP_URL_MISSING.to_string()]);
}
