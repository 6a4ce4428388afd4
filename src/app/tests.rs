use eframe::egui::{pos2, vec2};

use crate::influencers::{Dataset, read_csv_records};

use super::scale::RadiusScale;
use super::state::{ChartEvent, DetailCard};
use super::{ChartConfig, ViewModel};

const THREE_ROWS: &str = "\
Rank,Channel Info,Country Or Region,Followers,60-Day Eng Rate,Influence Score,Avg. Likes,Posts,ImageURL
1,alpha,US,1m,1.5%,90,120k,1.2k,
2,beta,India,2m,0.8%,85,300k,900,
3,gamma,US,500k,2.1%,70,50k,300,
";

fn config() -> ChartConfig {
    ChartConfig {
        data: "memory.csv".to_owned(),
        backdrop: String::new(),
        seed: Some(42),
        radius_range: RadiusScale::DEFAULT_RANGE,
    }
}

fn model() -> ViewModel {
    let records = read_csv_records(THREE_ROWS.as_bytes()).expect("valid csv");
    let dataset = Dataset {
        source: "memory.csv".to_owned(),
        records,
    };
    ViewModel::new(dataset, &config())
}

fn visible_ranks(model: &ViewModel) -> Vec<u32> {
    model.bubbles.iter().map(|bubble| bubble.rank).collect()
}

fn simulated_ranks(model: &ViewModel) -> Vec<u32> {
    let mut ranks = model
        .simulation
        .as_ref()
        .expect("layout created")
        .nodes()
        .iter()
        .map(|node| node.rank)
        .collect::<Vec<_>>();
    ranks.sort_unstable();
    ranks
}

#[test]
fn largest_follower_count_gets_largest_radius() {
    let mut model = model();
    assert_eq!(model.scale.domain(), (500_000.0, 2_000_000.0));

    model.ensure_layout(vec2(1000.0, 700.0), 0.0);
    assert_eq!(visible_ranks(&model), vec![1, 2, 3]);

    let radius = |rank| model.bubbles.get(rank).expect("visible").radius;
    assert!((radius(3) - 20.0).abs() < 1e-3);
    assert!((radius(2) - 65.0).abs() < 1e-3);
    assert!(radius(2) > radius(1) && radius(1) > radius(3));
}

#[test]
fn country_filter_keeps_bubbles_and_layout_in_step() {
    let mut model = model();
    model.ensure_layout(vec2(1000.0, 700.0), 0.0);
    let simulation = model.simulation.as_mut().expect("layout created");
    while simulation.tick() {}
    let settled = simulation.position(1).expect("rank 1 laid out");

    model.dispatch(&ChartEvent::ToggleCountry("US".to_owned()), 5.0);
    assert_eq!(visible_ranks(&model), vec![1, 3]);
    assert_eq!(simulated_ranks(&model), vec![1, 3]);

    let simulation = model.simulation.as_ref().expect("layout kept");
    assert!(simulation.is_running());
    assert_eq!(simulation.position(1), Some(settled));

    model.dispatch(&ChartEvent::ClearFilters, 6.0);
    assert_eq!(visible_ranks(&model), vec![1, 2, 3]);
    assert_eq!(simulated_ranks(&model), vec![1, 2, 3]);
    let reentered = model.bubbles.get(2).expect("rank 2 back");
    assert_eq!(reentered.enter_at, 6.0);
}

#[test]
fn card_events_leave_visible_set_alone() {
    let mut model = model();
    model.ensure_layout(vec2(800.0, 600.0), 0.0);

    model.dispatch(
        &ChartEvent::BubbleClicked {
            rank: 2,
            anchor: pos2(110.0, 60.0),
        },
        1.0,
    );
    assert_eq!(
        model.chart.card,
        DetailCard::Open {
            rank: 2,
            anchor: pos2(110.0, 60.0)
        }
    );
    assert_eq!(visible_ranks(&model), vec![1, 2, 3]);

    model.dispatch(&ChartEvent::ClickedOutsideCard, 2.0);
    assert_eq!(model.chart.card, DetailCard::Closed);
}

#[test]
fn resize_restarts_layout_around_new_center() {
    let mut model = model();
    model.ensure_layout(vec2(800.0, 600.0), 0.0);
    let simulation = model.simulation.as_mut().expect("layout created");
    while simulation.tick() {}

    model.ensure_layout(vec2(1200.0, 900.0), 1.0);
    let simulation = model.simulation.as_ref().expect("layout kept");
    assert!(simulation.is_running());
    assert_eq!(simulation.center(), vec2(600.0, 450.0));
}
