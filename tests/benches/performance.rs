use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use kickscout_core::{calculate_metrics, reconcile, ListingRecord, ListingSet, PriceData, SourceSnapshot};
use kickscout_scrapers::{crawl, ListingParser, PageFetcher, SearchQuery};
use rand::Rng;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

const IDENTIFIER: &str = "DD1391-100";

// Helper function to generate a result page with `count` entries, every
// other one mentioning the identifier
fn generate_result_page(count: usize, has_next: bool) -> String {
    let mut rng = rand::thread_rng();
    let items: String = (0..count)
        .map(|i| {
            let words: String = Sentence(3..8).fake();
            let title = if i % 2 == 0 {
                format!("Nike Dunk Low {} {}", IDENTIFIER, words)
            } else {
                words
            };
            format!(
                r#"<li class="s-item"><div class="s-item__info">
                    <span class="s-item__caption--signal POSITIVE">Sold {} days ago</span>
                    <a class="s-item__link" href="https://www.ebay.com/itm/{}"><div class="s-item__title"><span>{}</span></div></a>
                    <span class="s-item__price">${:.2}</span>
                </div></li>"#,
                rng.gen_range(1..200),
                i,
                title,
                rng.gen_range(60.0..1500.0)
            )
        })
        .collect();

    let next = if has_next {
        r#"<a class="pagination__next" href="?_pgn=2"></a>"#
    } else {
        r#"<button class="pagination__next" aria-disabled="true" disabled></button>"#
    };
    format!(
        "<html><body><ul class=\"srp-results\">{}</ul><nav class=\"pagination\">{}</nav></body></html>",
        items, next
    )
}

// Helper function to generate fake listings
fn generate_fake_listings(count: usize) -> ListingSet {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let records = (0..count)
        .map(|_| {
            let title: String = Sentence(4..10).fake();
            let record = ListingRecord::new(title, rng.gen_range(0.0..1500.0));
            if rng.gen_bool(0.8) {
                record.with_sale_date(now - Duration::days(rng.gen_range(0..365)))
            } else {
                record
            }
        })
        .collect();
    ListingSet::from_records(IDENTIFIER, records)
}

struct PagesFetcher {
    pages: Vec<String>,
}

#[async_trait::async_trait]
impl PageFetcher for PagesFetcher {
    async fn fetch_page(&self, query: &SearchQuery) -> kickscout_core::Result<String> {
        self.pages
            .get(query.page as usize - 1)
            .cloned()
            .ok_or_else(|| kickscout_core::KicksError::Transport("no more pages".to_string()))
    }
}

fn bench_parsing(c: &mut Criterion) {
    let parser = ListingParser::new().unwrap();
    let now = Utc::now();

    let mut group = c.benchmark_group("parsing");
    for size in [10, 50, 100].iter() {
        let html = generate_result_page(*size, true);
        group.bench_with_input(BenchmarkId::new("parse_page", size), &html, |b, html| {
            b.iter(|| black_box(parser.parse_page(html, IDENTIFIER, now)));
        });
    }
    group.finish();
}

fn bench_crawl(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let parser = ListingParser::new().unwrap();
    let parser = &parser;

    let mut group = c.benchmark_group("crawl");
    group.sample_size(20);
    for pages in [1, 5].iter() {
        let fetcher = PagesFetcher {
            pages: (0..*pages)
                .map(|i| generate_result_page(100, i + 1 < *pages))
                .collect(),
        };
        group.bench_with_input(BenchmarkId::new("pages", pages), &fetcher, |b, fetcher| {
            b.to_async(&rt).iter(|| async move {
                black_box(crawl(fetcher, parser, IDENTIFIER, None, &CancellationToken::new()).await)
            });
        });
    }
    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let now = Utc::now();

    let mut group = c.benchmark_group("metrics");
    for size in [100, 1000, 10000].iter() {
        let listings = generate_fake_listings(*size);
        group.bench_with_input(BenchmarkId::new("calculate", size), &listings, |b, listings| {
            b.iter(|| black_box(calculate_metrics(listings, now).unwrap()));
        });
    }
    group.finish();

    let resale_index = SourceSnapshot::Available(PriceData {
        name: Some("Nike Dunk Low Retro White Black Panda".to_string()),
        avg_price: Some(118.5),
        ..PriceData::default()
    });
    let auction = SourceSnapshot::Available(
        calculate_metrics(&generate_fake_listings(100), now).unwrap().into(),
    );
    let marketplace = SourceSnapshot::unavailable("No GOAT price found for this SKU");
    c.bench_function("reconcile", |b| {
        b.iter(|| black_box(reconcile(&resale_index, &auction, &marketplace)));
    });
}

criterion_group!(benches, bench_parsing, bench_crawl, bench_metrics);
criterion_main!(benches);
