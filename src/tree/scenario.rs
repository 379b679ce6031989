use crate::tree::node::{Choice, Node};
use crate::tree::{DecisionGraph, GraphError};

// ---------------------------------------------------------------------------
// Television support scenario
// ---------------------------------------------------------------------------

/// Default tree used when no graph file is given: first-line support for a
/// television that shows no picture.
pub fn tv_support_scenario() -> Result<DecisionGraph, GraphError> {
    let nodes = vec![
        Node::new(
            "start",
            "Ask customer: \"Does your TV turn on when you press the power button?\"",
        )
        .with_guidance("Wait for a clear response before proceeding")
        .with_option(Choice::continue_to("Yes - TV turns on normally", "tv-on"))
        .with_option(Choice::continue_to("No - TV does not turn on", "power-issue"))
        .with_option(Choice::continue_to(
            "Partially - Shows some signs of power",
            "partial-power",
        )),
        Node::new(
            "tv-on",
            "Ask customer: \"Do you currently have an active subscription service?\"",
        )
        .with_guidance("Check their account status if they are unsure")
        .with_option(Choice::continue_to("Yes - Active subscription", "signal-check"))
        .with_option(Choice::article("No - No subscription", "subscription-setup"))
        .with_option(Choice::continue_to("Unsure - Need to check", "account-verify")),
        Node::new(
            "account-verify",
            "Ask customer: \"Can you confirm the email address on your account?\"",
        )
        .with_guidance("Look the account up and read back the subscription status")
        .with_option(Choice::continue_to("Subscription is active", "signal-check"))
        .with_option(Choice::article("Subscription has lapsed", "subscription-renewal"))
        .with_option(Choice::article("No account found", "subscription-setup")),
        Node::new(
            "power-issue",
            "Ask customer: \"Is the power cord securely connected to both the TV and wall outlet?\"",
        )
        .with_guidance("Have them physically check both connections")
        .with_option(Choice::continue_to("Yes - Connections are secure", "outlet-test"))
        .with_option(Choice::continue_to("No - Found loose connection", "reconnect-power"))
        .with_option(Choice::continue_to("Unsure - Will check now", "power-check-guide")),
        Node::new(
            "power-check-guide",
            "Ask customer: \"Please follow the cord from the back of the TV to the wall. Is it plugged in at both ends?\"",
        )
        .with_guidance("Stay on the line while they check")
        .with_option(Choice::continue_to("Both ends were already secure", "outlet-test"))
        .with_option(Choice::continue_to("One end was loose", "reconnect-power")),
        Node::new(
            "reconnect-power",
            "Ask customer: \"Please push the cord in firmly and press the power button again.\"",
        )
        .with_guidance("Wait for them to complete the action")
        .with_option(Choice::continue_to("TV turns on now", "tv-on"))
        .with_option(Choice::continue_to("Still no response", "outlet-test")),
        Node::new(
            "outlet-test",
            "Ask customer: \"Can you try plugging another device into the same outlet?\"",
        )
        .with_guidance("This tests if the outlet is working properly")
        .with_option(Choice::article(
            "Other device works - Outlet is fine",
            "tv-hardware-issue",
        ))
        .with_option(Choice::article("Other device does not work", "electrical-issue"))
        .with_option(Choice::continue_to("No other device available", "different-outlet")),
        Node::new(
            "different-outlet",
            "Ask customer: \"Please plug the TV into a different wall outlet and try again.\"",
        )
        .with_guidance("Any outlet in another room will do")
        .with_option(Choice::article("TV works in the other outlet", "electrical-issue"))
        .with_option(Choice::article("Still no response", "tv-hardware-issue")),
        Node::new(
            "partial-power",
            "Ask customer: \"What do you see? A standby light, a logo, or a flickering screen?\"",
        )
        .with_guidance("A standby light alone usually means the remote or input is at fault")
        .with_option(Choice::continue_to("Standby light only", "power-issue"))
        .with_option(Choice::article("Logo then shuts off", "tv-hardware-issue"))
        .with_option(Choice::continue_to("Flickering picture", "signal-quality")),
        Node::new(
            "signal-check",
            "Ask customer: \"Are you seeing any picture or just a black/blue screen?\"",
        )
        .with_guidance("Determine if this is a signal or display issue")
        .with_option(Choice::continue_to("Black screen - No picture", "no-signal"))
        .with_option(Choice::continue_to("Blue screen or \"No Signal\"", "input-check"))
        .with_option(Choice::continue_to("Picture but poor quality", "signal-quality")),
        Node::new(
            "no-signal",
            "Ask customer: \"Is the cable box or streaming device powered on?\"",
        )
        .with_guidance("Most black screens are a set-top box that is off or asleep")
        .with_option(Choice::continue_to("Yes - Box is on", "input-check"))
        .with_option(Choice::article("No - Box will not power on", "set-top-box-power")),
        Node::new(
            "input-check",
            "Ask customer: \"Press the Input or Source button on your remote. Does the picture come back?\"",
        )
        .with_guidance("They may need to cycle through several inputs")
        .with_option(Choice::article("Yes - Picture is back", "input-selection-tips"))
        .with_option(Choice::article("No - Still no signal", "cable-connection-guide")),
        Node::new(
            "signal-quality",
            "Ask customer: \"Is the problem pixelation, or is the picture blurry or flickering?\"",
        )
        .with_guidance("Pixelation points at the signal, blur and flicker at the panel")
        .with_option(Choice::article("Pixelated or freezing", "signal-strength-guide"))
        .with_option(Choice::article("Blurry or flickering", "picture-settings-guide"))
        .with_option(Choice::continue_to("Hard to tell", "signal-check")),
    ];

    DecisionGraph::new("start", nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_is_valid_and_fully_reachable() {
        let graph = tv_support_scenario().unwrap();
        assert_eq!(graph.start_node_id().as_str(), "start");
        assert_eq!(graph.reachable_from_start().len(), graph.len());
    }

    #[test]
    fn scenario_depth() {
        let graph = tv_support_scenario().unwrap();
        // start, partial-power, power-issue, power-check-guide, reconnect-power,
        // tv-on, account-verify, signal-check, no-signal, input-check
        assert_eq!(graph.longest_acyclic_path(), Some(10));
    }
}
